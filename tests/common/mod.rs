//! Shared fixtures: services wired over the in-memory store, with a seeded
//! root admin account (seeding proper is out-of-band bootstrap, so the
//! first admin goes straight into the store).

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use staffdir::auth::password;
use staffdir::config::AuthConfig;
use staffdir::entity::employee;
use staffdir::service::{AdminService, AuthService, DirectoryService, NewEmployee};
use staffdir::{Actor, EmployeeStore, MemoryStore, PermissionLevel};

/// Minimum bcrypt cost keeps the suite fast.
pub const TEST_COST: u32 = 4;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        token_secret: "test-secret".into(),
        token_ttl_hours: 24,
        bcrypt_cost: TEST_COST,
    }
}

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub directory: DirectoryService,
    pub auth: AuthService,
    pub admin_service: AdminService,
    pub admin: Actor,
}

pub async fn env() -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let config = auth_config();

    let directory = DirectoryService::new(store.clone(), &config);
    let auth = AuthService::new(store.clone(), config);
    let admin_service = AdminService::new(store.clone());
    let admin = seed_admin(&store).await;

    TestEnv {
        store,
        directory,
        auth,
        admin_service,
        admin,
    }
}

async fn seed_admin(store: &Arc<MemoryStore>) -> Actor {
    let now = Utc::now();
    let record = employee::Model {
        id: Uuid::new_v4(),
        employee_number: "ADM001".into(),
        first_name: "Root".into(),
        surname: "Admin".into(),
        email: ADMIN_EMAIL.into(),
        birth_date: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
        salary: Decimal::new(90_000, 0),
        role: "Administrator".into(),
        permission_level: PermissionLevel::Admin.as_str().into(),
        manager_id: None,
        is_active: true,
        password: password::hash_password(ADMIN_PASSWORD, TEST_COST).unwrap(),
        must_change_password: false,
        created_at: now,
        updated_at: now,
    };
    let created = store.insert(record).await.unwrap();
    Actor::from_record(&created)
}

/// New-employee fields with a derived unique email.
pub fn new_employee(
    number: &str,
    first_name: &str,
    surname: &str,
    level: Option<PermissionLevel>,
    manager_id: Option<Uuid>,
) -> NewEmployee {
    NewEmployee {
        employee_number: number.into(),
        first_name: first_name.into(),
        surname: surname.into(),
        email: format!("{}@example.com", number.to_lowercase()),
        birth_date: NaiveDate::from_ymd_opt(1992, 6, 15).unwrap(),
        salary: Decimal::new(45_000, 0),
        role: "Software Developer".into(),
        permission_level: level,
        manager_id,
    }
}

/// Fresh actor snapshot for a stored employee.
pub async fn actor_of(store: &Arc<MemoryStore>, id: Uuid) -> Actor {
    let record = store.find_by_id(id).await.unwrap().unwrap();
    Actor::from_record(&record)
}
