use async_trait::async_trait;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use super::PgStore;
use crate::error::AppError;
use crate::model::{
    Category, Event, EventDetail, EventFilter, EventInfo, Location, Patch, Schedule,
};
use crate::store::{EventChanges, EventStore, NewEvent};

const EVENT_COLUMNS: &str =
    "id, name, start_time, end_time, creator_id, location_id, schedule_id, created_at";

/// 分类按名字 upsert，并发时由唯一约束裁决，永远只留一行
async fn upsert_categories_on(
    conn: &mut PgConnection,
    names: &[String],
) -> Result<Vec<Category>, sqlx::Error> {
    let mut categories = Vec::with_capacity(names.len());
    for name in names {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
        categories.push(category);
    }
    Ok(categories)
}

async fn upsert_location_on(
    conn: &mut PgConnection,
    city: &str,
    street: &str,
) -> Result<Location, sqlx::Error> {
    sqlx::query_as::<_, Location>(
        r#"
        INSERT INTO locations (city, street)
        VALUES ($1, $2)
        ON CONFLICT (city, street) DO UPDATE SET city = EXCLUDED.city
        RETURNING id, city, street
        "#,
    )
    .bind(city)
    .bind(street)
    .fetch_one(&mut *conn)
    .await
}

async fn replace_category_links(
    conn: &mut PgConnection,
    event_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM event_categories WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;
    for category_id in category_ids {
        sqlx::query("INSERT INTO event_categories (event_id, category_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(category_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, new: NewEvent) -> Result<EventDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let categories = upsert_categories_on(&mut *tx, &new.category_names).await?;

        // 日程没有自然键，总是新插入
        let schedule = match &new.schedule_description {
            Some(description) => Some(
                sqlx::query_as::<_, Schedule>(
                    "INSERT INTO schedules (description) VALUES ($1) RETURNING id, description",
                )
                .bind(description)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        let location = upsert_location_on(&mut *tx, &new.city, &new.street).await?;

        // 创建者必须已经存在
        let creator_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(new.creator_id)
                .fetch_one(&mut *tx)
                .await?;
        if !creator_exists {
            return Err(AppError::not_found("creator not found"));
        }

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (name, start_time, end_time, creator_id, location_id, schedule_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.creator_id)
        .bind(location.id)
        .bind(schedule.as_ref().map(|s| s.id))
        .fetch_one(&mut *tx)
        .await?;

        for category in &categories {
            sqlx::query("INSERT INTO event_categories (event_id, category_id) VALUES ($1, $2)")
                .bind(event.id)
                .bind(category.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(EventDetail {
            event,
            location,
            schedule,
            categories,
            participant_ids: Vec::new(),
        })
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn event_detail(&self, id: i64) -> Result<Option<EventDetail>, AppError> {
        let Some(event) = self.find_event(id).await? else {
            return Ok(None);
        };

        let location = sqlx::query_as::<_, Location>(
            "SELECT id, city, street FROM locations WHERE id = $1",
        )
        .bind(event.location_id)
        .fetch_one(&self.pool)
        .await?;

        let schedule = match event.schedule_id {
            Some(schedule_id) => {
                sqlx::query_as::<_, Schedule>(
                    "SELECT id, description FROM schedules WHERE id = $1",
                )
                .bind(schedule_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name
            FROM categories c
            JOIN event_categories ec ON ec.category_id = c.id
            WHERE ec.event_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let participant_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM event_participants WHERE event_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(EventDetail {
            event,
            location,
            schedule,
            categories,
            participant_ids,
        }))
    }

    async fn update_event(&self, id: i64, changes: EventChanges) -> Result<EventDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(event) = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::not_found("event not found"));
        };

        sqlx::query(
            r#"
            UPDATE events
            SET name = COALESCE($2, name),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .execute(&mut *tx)
        .await?;

        match changes.schedule_description {
            Patch::Absent => {}
            Patch::Clear => {
                if let Some(schedule_id) = event.schedule_id {
                    sqlx::query("UPDATE schedules SET description = NULL WHERE id = $1")
                        .bind(schedule_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
            Patch::Set(description) => match event.schedule_id {
                Some(schedule_id) => {
                    sqlx::query("UPDATE schedules SET description = $2 WHERE id = $1")
                        .bind(schedule_id)
                        .bind(description)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    let schedule_id: i64 = sqlx::query_scalar(
                        "INSERT INTO schedules (description) VALUES ($1) RETURNING id",
                    )
                    .bind(description)
                    .fetch_one(&mut *tx)
                    .await?;
                    sqlx::query("UPDATE events SET schedule_id = $2 WHERE id = $1")
                        .bind(id)
                        .bind(schedule_id)
                        .execute(&mut *tx)
                        .await?;
                }
            },
        }

        if let Some(names) = changes.category_names {
            let categories = upsert_categories_on(&mut *tx, &names).await?;
            let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
            replace_category_links(&mut *tx, id, &ids).await?;
        }

        tx.commit().await?;

        self.event_detail(id)
            .await?
            .ok_or_else(|| AppError::not_found("event not found"))
    }

    async fn delete_event(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(event) = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::not_found("event not found"));
        };

        // 评论、聊天、任务、清单项、图片、参与者、分类关联由外键级联
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(schedule_id) = event.schedule_id {
            sqlx::query("DELETE FROM schedules WHERE id = $1")
                .bind(schedule_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventInfo>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT e.id, e.name, e.start_time, e.end_time, e.creator_id, l.city, l.street
            FROM events e
            JOIN locations l ON e.location_id = l.id
            WHERE 1=1
            "#,
        );

        // 给出的条件才参与过滤，缺省字段不贡献任何谓词
        if let Some(id) = filter.id {
            qb.push(" AND e.id = ").push_bind(id);
        }
        if let Some(ref name) = filter.name {
            qb.push(" AND e.name ILIKE ")
                .push_bind(format!("%{}%", name));
        }
        if let Some(ref city) = filter.city {
            qb.push(" AND l.city = ").push_bind(city.clone());
        }
        if let Some(ref street) = filter.street {
            qb.push(" AND l.street = ").push_bind(street.clone());
        }
        if let Some(ref category_ids) = filter.category_ids {
            // 分类集合内部取或：命中任一分类即可
            qb.push(
                " AND e.id IN (SELECT ec.event_id FROM event_categories ec WHERE ec.category_id IN (",
            );
            let mut separated = qb.separated(", ");
            for category_id in category_ids {
                separated.push_bind(*category_id);
            }
            qb.push("))");
        }
        if let Some(start_date) = filter.start_date {
            qb.push(" AND e.start_time::date = ").push_bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            qb.push(" AND e.end_time::date = ").push_bind(end_date);
        }

        qb.push(" ORDER BY e.start_time ASC");

        let events = qb
            .build_query_as::<EventInfo>()
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn events_created_by(&self, user_id: i64) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE creator_id = $1 ORDER BY start_time"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn events_joined_by(&self, user_id: i64) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE id IN (SELECT event_id FROM event_participants WHERE user_id = $1)
            ORDER BY start_time
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn is_event_creator(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1 AND creator_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn is_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM event_participants WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let event_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        if !event_exists {
            return Err(AppError::not_found("event not found"));
        }

        // 已在组内时不写库，返回 false
        let result = sqlx::query(
            r#"
            INSERT INTO event_participants (event_id, user_id, joined_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let event_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        if !event_exists {
            return Err(AppError::not_found("event not found"));
        }

        let result =
            sqlx::query("DELETE FROM event_participants WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_categories(&self, names: &[String]) -> Result<Vec<Category>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let categories = upsert_categories_on(&mut *conn, names).await?;
        Ok(categories)
    }

    async fn upsert_location(&self, city: &str, street: &str) -> Result<Location, AppError> {
        let mut conn = self.pool.acquire().await?;
        let location = upsert_location_on(&mut *conn, city, street).await?;
        Ok(location)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }
}
