use serde::{Deserialize, Serialize};

use super::{required, Entity, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub description: Option<String>,
    /// Id of the creating user. Not checked against the user collection.
    pub created_by: String,
}

impl Entity for Group {
    const COLLECTION: &'static str = "group";
}

#[derive(Debug, Default, Deserialize)]
pub struct NewGroup {
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

impl TryFrom<NewGroup> for Group {
    type Error = ValidationError;

    fn try_from(input: NewGroup) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required(input.name, "name")?,
            description: input.description,
            created_by: required(input.created_by, "created_by")?,
        })
    }
}
