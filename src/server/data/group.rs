use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

pub struct GroupRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GroupRepository<'a> {
    /// Creates a new instance of [`GroupRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get all groups a user is a member of, ordered by name
    pub async fn get_for_user(&self, user_id: i32) -> Result<Vec<entity::auth_group::Model>, DbErr> {
        let group_ids = entity::prelude::AuthUserGroup::find()
            .filter(entity::auth_user_group::Column::UserId.eq(user_id))
            .select_only()
            .column(entity::auth_user_group::Column::GroupId)
            .into_tuple::<i32>()
            .all(self.db)
            .await?;

        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        entity::prelude::AuthGroup::find()
            .filter(entity::auth_group::Column::Id.is_in(group_ids))
            .order_by_asc(entity::auth_group::Column::Name)
            .all(self.db)
            .await
    }

    /// Get the permission codenames granted by any of the provided groups
    pub async fn get_permissions(&self, group_ids: &[i32]) -> Result<Vec<String>, DbErr> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        entity::prelude::AuthGroupPermission::find()
            .filter(entity::auth_group_permission::Column::GroupId.is_in(group_ids.to_vec()))
            .select_only()
            .column(entity::auth_group_permission::Column::Permission)
            .distinct()
            .into_tuple::<String>()
            .all(self.db)
            .await
    }

    /// Get the names of every group
    pub async fn get_all_names(&self) -> Result<Vec<String>, DbErr> {
        entity::prelude::AuthGroup::find()
            .select_only()
            .column(entity::auth_group::Column::Name)
            .order_by_asc(entity::auth_group::Column::Name)
            .into_tuple::<String>()
            .all(self.db)
            .await
    }

    /// Get the IDs of every member of a group
    pub async fn get_member_ids(&self, group_id: i32) -> Result<Vec<i32>, DbErr> {
        entity::prelude::AuthUserGroup::find()
            .filter(entity::auth_user_group::Column::GroupId.eq(group_id))
            .select_only()
            .column(entity::auth_user_group::Column::UserId)
            .into_tuple::<i32>()
            .all(self.db)
            .await
    }
}
