use std::collections::BTreeMap;

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use crate::server::model::service::RoleId;

/// Explicit TeamSpeak server group assignments configured by administrators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Teamspeak3Mappings {
    /// Local group ID to the server groups its members receive.
    pub groups: BTreeMap<i32, Vec<RoleId>>,
    /// Local state ID to the server group its members receive.
    pub states: BTreeMap<i32, RoleId>,
}

pub struct Teamspeak3MappingRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> Teamspeak3MappingRepository<'a> {
    /// Creates a new instance of [`Teamspeak3MappingRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get every group & state server group mapping
    pub async fn get_all(&self) -> Result<Teamspeak3Mappings, DbErr> {
        let mut mappings = Teamspeak3Mappings::default();

        for mapping in entity::prelude::Teamspeak3GroupMapping::find()
            .all(self.db)
            .await?
        {
            mappings
                .groups
                .entry(mapping.group_id)
                .or_default()
                .push(mapping.ts_group_id as RoleId);
        }

        for mapping in entity::prelude::Teamspeak3StateGroup::find()
            .all(self.db)
            .await?
        {
            mappings
                .states
                .insert(mapping.state_id, mapping.ts_group_id as RoleId);
        }

        Ok(mappings)
    }
}
