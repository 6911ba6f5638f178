use compact_str::CompactString;

use crate::error::{QueryError, Result};
use crate::path::{EntityPath, Path};
use crate::schema::EntityDescriptor;

/// Aliases visible to a statement, chained to the enclosing statement's scope.
pub(crate) struct Scope<'p> {
    aliases: Vec<(&'p str, &'static EntityDescriptor)>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    pub(crate) fn new(parent: Option<&'p Scope<'p>>) -> Self {
        Self {
            aliases: Vec::new(),
            parent,
        }
    }

    pub(crate) fn declare(&mut self, entity: &'p EntityPath) -> Result<()> {
        if self.aliases.iter().any(|(alias, _)| *alias == entity.alias()) {
            return Err(QueryError::InvalidStatement(format!(
                "alias `{}` declared twice",
                entity.alias()
            )));
        }
        self.aliases.push((entity.alias(), entity.entity()));
        Ok(())
    }

    fn lookup(&self, alias: &str) -> Option<&'static EntityDescriptor> {
        self.aliases
            .iter()
            .find(|(declared, _)| *declared == alias)
            .map(|(_, entity)| *entity)
            .or_else(|| self.parent.and_then(|parent| parent.lookup(alias)))
    }

    /// Ensures the alias is declared here or in an enclosing scope.
    pub(crate) fn resolve_alias(&self, alias: &str) -> Result<&'static EntityDescriptor> {
        self.lookup(alias)
            .ok_or_else(|| QueryError::UnresolvedAlias(CompactString::from(alias)))
    }

    /// Ensures the path's alias is declared and bound to the path's entity.
    pub(crate) fn resolve(&self, path: &Path) -> Result<()> {
        let entity = self.resolve_alias(path.root_alias())?;
        if entity.is(path.entity()) {
            Ok(())
        } else {
            Err(QueryError::UnresolvedAlias(compact_str::format_compact!(
                "{} (bound to {}, not {})",
                path.root_alias(),
                entity.name,
                path.entity().name
            )))
        }
    }
}
