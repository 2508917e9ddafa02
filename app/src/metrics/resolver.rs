use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::entity::{repository, scan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanIdentity {
    pub repository_id: i32,
    pub scan_id: i32,
}

/// Maps a repository name to the scan new measurements should attach to.
///
/// Upstream tools run as parallel pipeline steps and each POST their result
/// independently, so submissions landing inside the grouping window fold
/// into the newest open scan. Two genuinely separate runs inside one window
/// merge as well; that imprecision is accepted rather than papered over
/// with an explicit run token. Concurrent first submissions for a brand-new
/// repository are caught by the unique constraint on the name.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    repo_name: &str,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<ScanIdentity, DbErr> {
    let repository_id = match repository::Entity::find()
        .filter(repository::Column::Name.eq(repo_name))
        .one(db)
        .await?
    {
        Some(repo) => repo.id,
        None => {
            repository::ActiveModel {
                name: Set(repo_name.to_string()),
                selected_metrics: Set(None),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
    };

    let cutoff = now - window;
    let scan_id = match scan::Entity::find()
        .filter(scan::Column::RepositoryId.eq(repository_id))
        .filter(scan::Column::StartedAt.gt(cutoff))
        .order_by_desc(scan::Column::StartedAt)
        .one(db)
        .await?
    {
        Some(open) => open.id,
        None => {
            scan::ActiveModel {
                repository_id: Set(repository_id),
                started_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
    };

    Ok(ScanIdentity {
        repository_id,
        scan_id,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    fn repo(id: i32, name: &str) -> repository::Model {
        repository::Model {
            id,
            name: name.to_string(),
            selected_metrics: None,
            created_at: now() - Duration::days(30),
        }
    }

    #[tokio::test]
    async fn reuses_the_open_scan_inside_the_window() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![repo(7, "acme/shop")]])
            .append_query_results([vec![scan::Model {
                id: 42,
                repository_id: 7,
                started_at: now() - Duration::minutes(2),
            }]])
            .into_connection();

        let identity = resolve(&db, "acme/shop", Duration::minutes(5), now())
            .await
            .unwrap();

        assert_eq!(
            identity,
            ScanIdentity {
                repository_id: 7,
                scan_id: 42
            }
        );
    }

    #[tokio::test]
    async fn opens_a_new_scan_when_the_window_lapsed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![repo(7, "acme/shop")]])
            // no scan inside the window
            .append_query_results([Vec::<scan::Model>::new()])
            // the insert's returning row
            .append_query_results([vec![scan::Model {
                id: 43,
                repository_id: 7,
                started_at: now(),
            }]])
            .into_connection();

        let identity = resolve(&db, "acme/shop", Duration::minutes(5), now())
            .await
            .unwrap();

        assert_eq!(identity.scan_id, 43);
    }

    #[tokio::test]
    async fn creates_the_repository_on_first_contact() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<repository::Model>::new()])
            .append_query_results([vec![repo(1, "acme/new")]])
            .append_query_results([Vec::<scan::Model>::new()])
            .append_query_results([vec![scan::Model {
                id: 1,
                repository_id: 1,
                started_at: now(),
            }]])
            .into_connection();

        let identity = resolve(&db, "acme/new", Duration::minutes(5), now())
            .await
            .unwrap();

        assert_eq!(
            identity,
            ScanIdentity {
                repository_id: 1,
                scan_id: 1
            }
        );
    }
}
