//! The sans-IO document assembler.
//!
//! [`DocumentAssembler`] consumes [`Token`]s and descends
//! `REQ-IF` → `CORE-CONTENT` → `REQ-IF-CONTENT` → section. Each top-level
//! entity is collected into an [`Element`] subtree and handed to its reader
//! once complete. The assembler never performs I/O, so the blocking and the
//! async frontends drive exactly the same state machine.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    kind, read,
    tree::{Element, StartTag, Token, TreeBuilder, local_name},
};
use crate::{
    domain::{ReqIf, ToolExtension},
    error::{Error, Result},
};

/// The six content sections, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Datatypes,
    SpecTypes,
    SpecObjects,
    SpecRelations,
    Specifications,
    RelationGroups,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "DATATYPES" => Self::Datatypes,
            "SPEC-TYPES" => Self::SpecTypes,
            "SPEC-OBJECTS" => Self::SpecObjects,
            "SPEC-RELATIONS" => Self::SpecRelations,
            "SPECIFICATIONS" => Self::Specifications,
            "SPEC-RELATION-GROUPS" => Self::RelationGroups,
            _ => return None,
        })
    }

    /// Whether `name` is an entity this section holds.
    ///
    /// Names that look like datatypes or spec types must resolve; anything
    /// else is left to the caller to skip.
    fn accepts(self, name: &str) -> Result<bool> {
        match self {
            Self::Datatypes if name.starts_with("DATATYPE-DEFINITION-") => {
                kind::datatype_kind(name).map(|_| true)
            }
            Self::SpecTypes if name.ends_with("-TYPE") => kind::spec_type_kind(name).map(|_| true),
            Self::SpecObjects => Ok(name == "SPEC-OBJECT"),
            Self::SpecRelations => Ok(name == "SPEC-RELATION"),
            Self::Specifications => Ok(name == "SPECIFICATION"),
            Self::RelationGroups => Ok(name == "RELATION-GROUP"),
            Self::Datatypes | Self::SpecTypes => Ok(false),
        }
    }
}

/// Where the assembler currently is in the document skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Header,
    CoreContent,
    Content,
    Section(Section),
    ToolExtensions,
}

/// What a captured subtree will become.
#[derive(Debug, Clone, Copy)]
enum Target {
    Header,
    Entity(Section),
    ToolExtension,
}

/// Builds one [`ReqIf`] from a token stream.
#[derive(Debug)]
pub struct DocumentAssembler {
    document: ReqIf,
    seen_root: bool,
    scopes: Vec<Scope>,
    capture: Option<(Target, TreeBuilder)>,
    skip_depth: usize,
    cancellation: CancellationToken,
}

impl DocumentAssembler {
    /// An assembler that gives up with [`Error::Cancelled`] once
    /// `cancellation` fires.
    #[must_use]
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            document: ReqIf::default(),
            seen_root: false,
            scopes: Vec::new(),
            capture: None,
            skip_depth: 0,
            cancellation,
        }
    }

    /// Fail with [`Error::Cancelled`] if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] once the token has fired.
    pub fn checkpoint(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Consume the next token.
    ///
    /// # Errors
    ///
    /// Returns an error if cancellation was requested, if an entity cannot be
    /// read, or if the stream is not a ReqIF document.
    pub fn feed(&mut self, token: Token) -> Result<()> {
        self.checkpoint()?;

        if let Some((target, builder)) = &mut self.capture {
            let target = *target;
            if let Some(element) = builder.feed(token) {
                self.capture = None;
                self.dispatch(target, &element)?;
            }
            return Ok(());
        }

        if self.skip_depth > 0 {
            match token {
                Token::Start(_) => self.skip_depth += 1,
                Token::End => self.skip_depth -= 1,
                Token::Empty(_) | Token::Text(_) => {}
            }
            return Ok(());
        }

        match token {
            Token::Start(tag) => self.enter(tag, false),
            Token::Empty(tag) => self.enter(tag, true),
            Token::End => {
                self.scopes.pop();
                Ok(())
            }
            Token::Text(_) => Ok(()),
        }
    }

    /// Finish assembly once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if cancellation was requested or no `REQ-IF` root was
    /// seen.
    pub fn finish(self) -> Result<ReqIf> {
        self.checkpoint()?;
        if !self.seen_root {
            return Err(Error::xml(0, "no REQ-IF root element"));
        }
        if !self.scopes.is_empty() || self.capture.is_some() {
            return Err(Error::xml(0, "document ended inside an open element"));
        }
        Ok(self.document)
    }

    fn enter(&mut self, tag: StartTag, empty: bool) -> Result<()> {
        let name = local_name(&tag.name);
        let Some(&scope) = self.scopes.last() else {
            return self.enter_document(tag, empty);
        };

        let next = match (scope, name) {
            (Scope::Root, "THE-HEADER") => Some(Scope::Header),
            (Scope::Root, "CORE-CONTENT") => Some(Scope::CoreContent),
            (Scope::Root, "TOOL-EXTENSIONS") => Some(Scope::ToolExtensions),
            (Scope::CoreContent, "REQ-IF-CONTENT") => Some(Scope::Content),
            (Scope::Content, section) => Section::from_name(section).map(Scope::Section),
            (Scope::Header, "REQ-IF-HEADER") => {
                return self.capture(Target::Header, tag, empty);
            }
            (Scope::ToolExtensions, "REQ-IF-TOOL-EXTENSION") => {
                return self.capture(Target::ToolExtension, tag, empty);
            }
            (Scope::Section(section), entity) => {
                if section.accepts(entity)? {
                    return self.capture(Target::Entity(section), tag, empty);
                }
                None
            }
            _ => None,
        };

        match next {
            Some(next) if !empty => self.scopes.push(next),
            Some(_) => {}
            None => self.skip(&tag, empty),
        }
        Ok(())
    }

    fn enter_document(&mut self, tag: StartTag, empty: bool) -> Result<()> {
        if self.seen_root || local_name(&tag.name) != "REQ-IF" {
            return Err(Error::xml(
                tag.location.offset,
                format!("expected a single REQ-IF root element, found <{}>", tag.name),
            ));
        }
        debug!(line = tag.location.line, "reading REQ-IF document");
        self.seen_root = true;
        self.document.attributes = tag.attributes;
        if !empty {
            self.scopes.push(Scope::Root);
        }
        Ok(())
    }

    fn capture(&mut self, target: Target, tag: StartTag, empty: bool) -> Result<()> {
        if empty {
            return self.dispatch(target, &tag.into());
        }
        self.capture = Some((target, TreeBuilder::new(tag)));
        Ok(())
    }

    fn skip(&mut self, tag: &StartTag, empty: bool) {
        warn!(
            element = %tag.name,
            line = tag.location.line,
            column = tag.location.column,
            "skipping unknown element"
        );
        if !empty {
            self.skip_depth = 1;
        }
    }

    fn dispatch(&mut self, target: Target, element: &Element) -> Result<()> {
        self.checkpoint()?;
        let content = &mut self.document.content;
        match target {
            Target::Header => self.document.header = read::read_header(element)?,
            Target::ToolExtension => self.document.tool_extensions.push(ToolExtension {
                markup: element.inner_xml(),
            }),
            Target::Entity(Section::Datatypes) => read::read_datatype(element, content)?,
            Target::Entity(Section::SpecTypes) => read::read_spec_type(element, content)?,
            Target::Entity(Section::SpecObjects) => read::read_spec_object(element, content)?,
            Target::Entity(Section::SpecRelations) => read::read_spec_relation(element, content)?,
            Target::Entity(Section::Specifications) => read::read_specification(element, content)?,
            Target::Entity(Section::RelationGroups) => {
                read::read_relation_group(element, content)?;
            }
        }
        Ok(())
    }
}
