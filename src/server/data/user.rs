use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait, QueryFilter, QuerySelect,
};

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Creates a new instance of [`UserRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a user by ID
    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<entity::auth_user::Model>, DbErr> {
        entity::prelude::AuthUser::find_by_id(user_id)
            .one(self.db)
            .await
    }

    /// Get the IDs of users whose main character is the provided EVE Online character
    pub async fn find_ids_by_main_character_id(&self, character_id: i64) -> Result<Vec<i32>, DbErr> {
        entity::prelude::AuthUser::find()
            .inner_join(entity::prelude::EveCharacter)
            .filter(entity::eve_character::Column::CharacterId.eq(character_id))
            .select_only()
            .column(entity::auth_user::Column::Id)
            .into_tuple::<i32>()
            .all(self.db)
            .await
    }

    /// Deletes a user
    ///
    /// Returns OK regardless of user existing, to confirm the deletion result
    /// check the [`DeleteResult::rows_affected`] field.
    pub async fn delete(&self, user_id: i32) -> Result<DeleteResult, DbErr> {
        entity::prelude::AuthUser::delete_by_id(user_id)
            .exec(self.db)
            .await
    }
}
