use crate::{
    Error, User, UserId, error::ValidationError, repositories::UserRepository, user::NewUser,
};
use std::sync::Arc;

/// Service for user account operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new account, hashing the password with a fresh salt
    pub async fn create_user(&self, login: &str, password: &str) -> Result<User, Error> {
        if login.trim().is_empty() {
            return Err(ValidationError::MissingField("login".to_string()).into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password".to_string()).into());
        }

        let new_user = NewUser::with_password(login, password);
        self.repository.create(new_user).await
    }

    /// Get an account by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// Get an account by login name
    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, Error> {
        self.repository.find_by_login(login).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockUserRepository {
        users: Mutex<HashMap<i64, User>>,
        next_id: Mutex<i64>,
    }

    impl MockUserRepository {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                next_id: Mutex::new(1),
            }
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn create(&self, user: NewUser) -> Result<User, Error> {
            let mut next_id = self.next_id.lock().unwrap();
            let id = UserId::new(*next_id);
            *next_id += 1;

            let user = User {
                id,
                login: user.login,
                password_hash: user.password_hash,
                salt: user.salt,
            };
            self.users
                .lock()
                .unwrap()
                .insert(id.as_i64(), user.clone());
            Ok(user)
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
            Ok(self.users.lock().unwrap().get(&id.as_i64()).cloned())
        }

        async fn find_by_login(&self, login: &str) -> Result<Option<User>, Error> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.login == login)
                .cloned())
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));

        let user = service.create_user("isucon", "donkey").await.unwrap();
        assert_eq!(user.login, "isucon");
        assert_ne!(user.password_hash, "donkey");
        assert!(user.verify_password("donkey"));
        assert!(!user.verify_password("monkey"));
    }

    #[tokio::test]
    async fn test_create_user_rejects_blank_login() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));

        let err = service.create_user("  ", "donkey").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = service.create_user("isucon", "").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_login() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let created = service.create_user("isucon", "donkey").await.unwrap();

        let by_id = service.get_user(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.login, "isucon");

        let by_login = service.get_user_by_login("isucon").await.unwrap().unwrap();
        assert_eq!(by_login.id, created.id);

        assert!(service.get_user_by_login("nobody").await.unwrap().is_none());
    }
}
