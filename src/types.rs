use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::data::Document;

/// `image` holds the reference token returned by the upload store, never the
/// file bytes themselves.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Project {
            id: Uuid::nil(),
            name: name.into(),
            description: description.into(),
            image: image.into(),
        }
    }
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub designation: String,
    pub image: String,
}

impl Client {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        designation: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Client {
            id: Uuid::nil(),
            name: name.into(),
            description: description.into(),
            designation: designation.into(),
            image: image.into(),
        }
    }
}

impl Document for Client {
    const COLLECTION: &'static str = "clients";

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// Success acknowledgment returned by the insert routes.
#[derive(Serialize, Debug)]
pub struct Ack {
    pub message: &'static str,
}

impl Ack {
    pub const fn new(message: &'static str) -> Self {
        Ack { message }
    }
}
