use sea_orm::entity::prelude::*;

/// Explicit mapping from a state to the TeamSpeak server group its members receive.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teamspeak3_state_group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub state_id: i32,
    pub ts_group_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::auth_state::Entity",
        from = "Column::StateId",
        to = "super::auth_state::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AuthState,
}

impl Related<super::auth_state::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthState.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
