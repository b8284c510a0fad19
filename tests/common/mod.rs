#![allow(dead_code)]

use diesel::RunQueryDsl;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

use ubigrowth::domain::ad_account::{AdAccount, AdCampaign, NewAdAccount, NewAdCampaign};
use ubigrowth::domain::lead::{Lead, NewLead};
use ubigrowth::domain::types::{
    AdCampaignName, Cents, NonEmptyString, WorkspaceId, WorkspaceName,
};
use ubigrowth::domain::workspace::{NewWorkspace, Workspace};
use ubigrowth::repository::{
    AdAccountWriter, DbPool, DieselRepository, LeadWriter, WorkspaceWriter,
    establish_connection_pool,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A migrated SQLite database living in a temporary directory.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("pool builds");

        let mut pooled = pool.get().expect("connection");
        let conn: &mut SqliteConnection = &mut pooled;
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrations run");

        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    /// Raw SQL for fixtures the repository has no writer for.
    pub fn execute(&self, sql: &str) {
        let mut conn = self.pool.get().expect("connection");
        diesel::sql_query(sql).execute(&mut conn).expect("sql runs");
    }
}

pub fn workspace(repo: &DieselRepository, name: &str) -> Workspace {
    repo.create_workspace(&NewWorkspace::new(
        WorkspaceName::new(name).expect("valid name"),
    ))
    .expect("workspace created")
}

pub fn lead(repo: &DieselRepository, workspace_id: WorkspaceId, name: &str, email: &str) -> Lead {
    let new_lead = NewLead::try_new(
        workspace_id.get(),
        name.into(),
        Some(email.into()),
        None,
        None,
        None,
    )
    .expect("valid lead");
    repo.create_lead(&new_lead).expect("lead created")
}

pub fn ad_account(repo: &DieselRepository, workspace_id: WorkspaceId, budget: i64) -> AdAccount {
    repo.create_ad_account(&NewAdAccount {
        workspace_id,
        platform: NonEmptyString::new("google").expect("valid platform"),
        name: NonEmptyString::new("Main").expect("valid name"),
        daily_budget: Cents::new(budget).expect("valid cents"),
        target_roas: 2.0,
    })
    .expect("ad account created")
}

pub fn ad_campaign(repo: &DieselRepository, account: &AdAccount, name: &str, budget: i64) -> AdCampaign {
    repo.create_ad_campaign(&NewAdCampaign {
        ad_account_id: account.id,
        workspace_id: account.workspace_id,
        name: AdCampaignName::new(name).expect("valid name"),
        daily_budget: Cents::new(budget).expect("valid cents"),
    })
    .expect("ad campaign created")
}
