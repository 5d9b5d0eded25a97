//! Object kinds stored in a library.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The kinds of objects a library holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Bibliographic items, notes and attachments.
    Item,
    /// Collections.
    Collection,
    /// Saved searches.
    Search,
    /// Tags (identified by name, not by key).
    Tag,
    /// Library settings.
    Setting,
}

impl ObjectType {
    /// Singular wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Item => "item",
            ObjectType::Collection => "collection",
            ObjectType::Search => "search",
            ObjectType::Tag => "tag",
            ObjectType::Setting => "setting",
        }
    }

    /// Plural form, used as the endpoint target.
    pub fn plural(&self) -> &'static str {
        match self {
            ObjectType::Item => "items",
            ObjectType::Collection => "collections",
            ObjectType::Search => "searches",
            ObjectType::Tag => "tags",
            ObjectType::Setting => "settings",
        }
    }

    /// Singular or plural name depending on `count`, for log lines.
    pub fn name_for(&self, count: usize) -> &'static str {
        if count == 1 {
            self.as_str()
        } else {
            self.plural()
        }
    }

    /// Query parameter that selects objects of this type by key.
    ///
    /// Tags are selected by name through `tag`. Settings cannot be
    /// selected through a query parameter.
    pub fn key_param(&self) -> Option<&'static str> {
        match self {
            ObjectType::Item => Some("itemKey"),
            ObjectType::Collection => Some("collectionKey"),
            ObjectType::Search => Some("searchKey"),
            ObjectType::Tag => Some("tag"),
            ObjectType::Setting => None,
        }
    }

    /// Separator used when joining several keys into [`Self::key_param`].
    pub fn key_separator(&self) -> &'static str {
        match self {
            ObjectType::Tag => "||",
            _ => ",",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(ObjectType::Item),
            "collection" => Ok(ObjectType::Collection),
            "search" => Ok(ObjectType::Search),
            "tag" => Ok(ObjectType::Tag),
            "setting" => Ok(ObjectType::Setting),
            other => Err(TypesError::UnknownObjectType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurals() {
        assert_eq!(ObjectType::Item.plural(), "items");
        assert_eq!(ObjectType::Collection.plural(), "collections");
        assert_eq!(ObjectType::Search.plural(), "searches");
        assert_eq!(ObjectType::Tag.plural(), "tags");
        assert_eq!(ObjectType::Setting.plural(), "settings");
    }

    #[test]
    fn name_for_count() {
        assert_eq!(ObjectType::Search.name_for(1), "search");
        assert_eq!(ObjectType::Search.name_for(0), "searches");
        assert_eq!(ObjectType::Search.name_for(3), "searches");
    }

    #[test]
    fn key_params() {
        assert_eq!(ObjectType::Item.key_param(), Some("itemKey"));
        assert_eq!(ObjectType::Tag.key_param(), Some("tag"));
        assert_eq!(ObjectType::Setting.key_param(), None);
        assert_eq!(ObjectType::Tag.key_separator(), "||");
        assert_eq!(ObjectType::Collection.key_separator(), ",");
    }

    #[test]
    fn parse_roundtrips_display() {
        for t in [
            ObjectType::Item,
            ObjectType::Collection,
            ObjectType::Search,
            ObjectType::Tag,
            ObjectType::Setting,
        ] {
            assert_eq!(t.to_string().parse::<ObjectType>().unwrap(), t);
        }
        assert!("relation".parse::<ObjectType>().is_err());
    }
}
