//! Attachment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `attachments` and join management over
//!   `attachment_joins`.
//! - Provide the base fetch: attachments of one source, filtered and ordered.
//!
//! # Invariants
//! - Listing order is `position ASC`, then join insertion order.
//! - Inactive attachments are hidden unless explicitly requested.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::attachment::{Attachment, AttachmentId, AttachmentValidationError, SourceRef};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ATTACHMENT_COLUMNS: &str = "a.uuid AS uuid,
    a.obj_type AS obj_type,
    a.title AS title,
    a.description AS description,
    a.file AS file,
    a.link AS link,
    a.metadata AS metadata,
    a.active AS active";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for attachment persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(AttachmentValidationError),
    Db(DbError),
    NotFound(AttachmentId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "attachment not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted attachment data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<AttachmentValidationError> for RepoError {
    fn from(value: AttachmentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and pagination options for one source's attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentQuery {
    pub group: Option<String>,
    pub obj_type: Option<String>,
    pub include_inactive: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl AttachmentQuery {
    pub fn in_group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..Self::default()
        }
    }

    pub fn of_type(obj_type: impl Into<String>) -> Self {
        Self {
            obj_type: Some(obj_type.into()),
            ..Self::default()
        }
    }
}

/// Repository interface for attachments and their joins to parent records.
pub trait AttachmentRepository {
    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<AttachmentId>;
    fn update_attachment(&self, attachment: &Attachment) -> RepoResult<()>;
    fn get_attachment(&self, id: AttachmentId) -> RepoResult<Option<Attachment>>;
    /// Deletes the row and every join pointing at it.
    fn delete_attachment(&self, id: AttachmentId) -> RepoResult<()>;
    /// Joins an attachment to a source. Returns the stored position.
    ///
    /// `position = None` appends after the last attachment of the group.
    /// Joining twice in the same group only moves the attachment.
    fn attach(
        &self,
        source: &SourceRef,
        id: AttachmentId,
        group: &str,
        position: Option<i64>,
    ) -> RepoResult<i64>;
    /// Removes joins of one attachment; `group = None` removes all groups.
    fn detach(&self, source: &SourceRef, id: AttachmentId, group: Option<&str>)
        -> RepoResult<usize>;
    /// Removes every join of a source; `group = None` removes all groups.
    fn detach_all(&self, source: &SourceRef, group: Option<&str>) -> RepoResult<usize>;
    /// Base fetch used by containers.
    fn list_attachments(
        &self,
        source: &SourceRef,
        query: &AttachmentQuery,
    ) -> RepoResult<Vec<Attachment>>;
    /// Counts matches, ignoring pagination.
    fn count_attachments(&self, source: &SourceRef, query: &AttachmentQuery) -> RepoResult<u64>;
}

/// SQLite-backed attachment repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteAttachmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttachmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, id: AttachmentId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM attachments WHERE uuid = ?1;",
                [id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn next_position(&self, source: &SourceRef, group: &str) -> RepoResult<i64> {
        let position = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0)
             FROM attachment_joins
             WHERE source_type = ?1 AND source_id = ?2 AND group_ident = ?3;",
            params![source.source_type, source.source_id, group],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(position)
    }
}

impl AttachmentRepository for SqliteAttachmentRepository<'_> {
    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<AttachmentId> {
        attachment.validate()?;

        self.conn.execute(
            "INSERT INTO attachments (
                uuid,
                obj_type,
                title,
                description,
                file,
                link,
                metadata,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                attachment.uuid.to_string(),
                attachment.obj_type.trim(),
                attachment.title.as_deref(),
                attachment.description.as_deref(),
                attachment.file.as_deref(),
                attachment.link.as_deref(),
                metadata_to_db(&attachment.metadata)?,
                bool_to_int(attachment.active),
            ],
        )?;

        Ok(attachment.uuid)
    }

    fn update_attachment(&self, attachment: &Attachment) -> RepoResult<()> {
        attachment.validate()?;

        let changed = self.conn.execute(
            "UPDATE attachments
             SET
                obj_type = ?1,
                title = ?2,
                description = ?3,
                file = ?4,
                link = ?5,
                metadata = ?6,
                active = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?8;",
            params![
                attachment.obj_type.trim(),
                attachment.title.as_deref(),
                attachment.description.as_deref(),
                attachment.file.as_deref(),
                attachment.link.as_deref(),
                metadata_to_db(&attachment.metadata)?,
                bool_to_int(attachment.active),
                attachment.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(attachment.uuid));
        }

        Ok(())
    }

    fn get_attachment(&self, id: AttachmentId) -> RepoResult<Option<Attachment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments a WHERE a.uuid = ?1;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attachment_row(row)?));
        }

        Ok(None)
    }

    fn delete_attachment(&self, id: AttachmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM attachments WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn attach(
        &self,
        source: &SourceRef,
        id: AttachmentId,
        group: &str,
        position: Option<i64>,
    ) -> RepoResult<i64> {
        if !self.exists(id)? {
            return Err(RepoError::NotFound(id));
        }

        let position = match position {
            Some(position) => position,
            None => self.next_position(source, group)?,
        };

        self.conn.execute(
            "INSERT INTO attachment_joins (
                source_type,
                source_id,
                attachment_id,
                group_ident,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (source_type, source_id, attachment_id, group_ident)
            DO UPDATE SET position = excluded.position;",
            params![
                source.source_type,
                source.source_id,
                id.to_string(),
                group,
                position
            ],
        )?;

        debug!(
            "event=attachment_join module=repo status=ok source_type={} group={} position={}",
            source.source_type, group, position
        );
        Ok(position)
    }

    fn detach(
        &self,
        source: &SourceRef,
        id: AttachmentId,
        group: Option<&str>,
    ) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM attachment_joins
             WHERE source_type = ?1
               AND source_id = ?2
               AND attachment_id = ?3
               AND (?4 IS NULL OR group_ident = ?4);",
            params![source.source_type, source.source_id, id.to_string(), group],
        )?;
        Ok(removed)
    }

    fn detach_all(&self, source: &SourceRef, group: Option<&str>) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM attachment_joins
             WHERE source_type = ?1
               AND source_id = ?2
               AND (?3 IS NULL OR group_ident = ?3);",
            params![source.source_type, source.source_id, group],
        )?;
        Ok(removed)
    }

    fn list_attachments(
        &self,
        source: &SourceRef,
        query: &AttachmentQuery,
    ) -> RepoResult<Vec<Attachment>> {
        let (mut sql, mut bind_values) = filtered_join_sql(
            &format!("SELECT {ATTACHMENT_COLUMNS}"),
            source,
            query,
        );

        sql.push_str(" ORDER BY j.position ASC, j.rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(SqlValue::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(SqlValue::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(SqlValue::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut attachments = Vec::new();

        while let Some(row) = rows.next()? {
            attachments.push(parse_attachment_row(row)?);
        }

        Ok(attachments)
    }

    fn count_attachments(&self, source: &SourceRef, query: &AttachmentQuery) -> RepoResult<u64> {
        let (sql, bind_values) = filtered_join_sql("SELECT COUNT(*)", source, query);
        let count = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| {
                row.get::<_, i64>(0)
            })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative attachment count `{count}`")))
    }
}

fn filtered_join_sql(
    select: &str,
    source: &SourceRef,
    query: &AttachmentQuery,
) -> (String, Vec<SqlValue>) {
    let mut sql = format!(
        "{select}
         FROM attachment_joins j
         JOIN attachments a ON a.uuid = j.attachment_id
         WHERE j.source_type = ? AND j.source_id = ?"
    );
    let mut bind_values = vec![
        SqlValue::Text(source.source_type.clone()),
        SqlValue::Text(source.source_id.clone()),
    ];

    if !query.include_inactive {
        sql.push_str(" AND a.active = 1");
    }

    if let Some(group) = &query.group {
        sql.push_str(" AND j.group_ident = ?");
        bind_values.push(SqlValue::Text(group.clone()));
    }

    if let Some(obj_type) = &query.obj_type {
        sql.push_str(" AND a.obj_type = ?");
        bind_values.push(SqlValue::Text(obj_type.clone()));
    }

    (sql, bind_values)
}

fn parse_attachment_row(row: &Row<'_>) -> RepoResult<Attachment> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in attachments.uuid"
        ))
    })?;

    let metadata_text: String = row.get("metadata")?;
    let metadata = serde_json::from_str::<Map<String, Value>>(&metadata_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid metadata in attachments.metadata: {err}"))
    })?;

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in attachments.active"
            )));
        }
    };

    let attachment = Attachment {
        uuid,
        obj_type: row.get("obj_type")?,
        title: row.get("title")?,
        description: row.get("description")?,
        file: row.get("file")?,
        link: row.get("link")?,
        metadata,
        active,
        attachment_type: None,
    };
    attachment.validate()?;
    Ok(attachment)
}

fn metadata_to_db(metadata: &Map<String, Value>) -> RepoResult<String> {
    serde_json::to_string(metadata)
        .map_err(|err| RepoError::InvalidData(format!("unserializable metadata: {err}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
