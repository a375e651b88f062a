//! Derive per-tenant connection URLs from the control-plane URL
//!
//! Only the final path segment of the base URL (the database name) is replaced.
//! Credentials, host, port and query parameters carry over untouched. For SQLite the
//! "database" is a file next to the control-plane file and keeps its extension.

use std::path::PathBuf;

use sea_orm::DbBackend;

use crate::error::TenancyError;

/// Recipe for turning a database name into a connection URL
#[derive(Debug, Clone)]
pub struct ConnectionTemplate {
    base_url: String,
    backend: DbBackend,
    /// Everything up to and including the last `/` before the database name
    prefix: String,
    /// File extension of the SQLite control-plane file, if any
    extension: Option<String>,
    /// Query parameters other than SQLite `mode`
    params: Vec<String>,
}

impl ConnectionTemplate {
    pub fn parse(base_url: &str) -> Result<Self, TenancyError> {
        let backend = backend_for(base_url)
            .ok_or_else(|| TenancyError::UnsupportedUrl(redact_url(base_url)))?;

        let (head, query) = match base_url.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (base_url, None),
        };

        let (prefix, last) = match backend {
            DbBackend::Sqlite => split_sqlite(head),
            _ => {
                let authority_start = head.find("://").map(|idx| idx + 3).unwrap_or(0);
                match head.rfind('/') {
                    Some(idx) if idx >= authority_start => (&head[..=idx], &head[idx + 1..]),
                    _ => return Err(TenancyError::UnsupportedUrl(redact_url(base_url))),
                }
            }
        };

        let extension = match backend {
            DbBackend::Sqlite => last
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_string())
                .filter(|ext| !ext.is_empty()),
            _ => None,
        };

        let params = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter(|param| !param.is_empty())
            .filter(|param| !(backend == DbBackend::Sqlite && param.starts_with("mode=")))
            .map(str::to_string)
            .collect();

        Ok(Self {
            base_url: base_url.to_string(),
            backend,
            prefix: prefix.to_string(),
            extension,
            params,
        })
    }

    pub fn backend(&self) -> DbBackend {
        self.backend
    }

    /// The control-plane URL this template was parsed from
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for day-to-day access to `database_name`
    ///
    /// SQLite handles open read-write without creating the file, so a missing tenant
    /// database surfaces as an error instead of an empty file.
    pub fn tenant_url(&self, database_name: &str) -> String {
        self.render(database_name, "rw")
    }

    /// URL used while provisioning; SQLite may create the file
    pub fn provisioning_url(&self, database_name: &str) -> String {
        self.render(database_name, "rwc")
    }

    /// Filesystem location of a SQLite tenant database
    pub fn sqlite_path(&self, database_name: &str) -> Option<PathBuf> {
        if self.backend != DbBackend::Sqlite {
            return None;
        }
        let dir = self
            .prefix
            .strip_prefix("sqlite://")
            .or_else(|| self.prefix.strip_prefix("sqlite:"))
            .unwrap_or_default();
        Some(PathBuf::from(format!("{dir}{}", self.file_name(database_name))))
    }

    fn file_name(&self, database_name: &str) -> String {
        match &self.extension {
            Some(ext) => format!("{database_name}.{ext}"),
            None => database_name.to_string(),
        }
    }

    fn render(&self, database_name: &str, sqlite_mode: &str) -> String {
        let mut params = self.params.clone();
        if self.backend == DbBackend::Sqlite {
            params.push(format!("mode={sqlite_mode}"));
        }

        let mut url = format!("{}{}", self.prefix, self.file_name(database_name));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }
}

fn backend_for(url: &str) -> Option<DbBackend> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Some(DbBackend::Postgres)
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Some(DbBackend::MySql)
    } else if url.starts_with("sqlite:") && !url.starts_with("sqlite::memory:") {
        Some(DbBackend::Sqlite)
    } else {
        None
    }
}

fn split_sqlite(head: &str) -> (&str, &str) {
    let scheme_len = if head.starts_with("sqlite://") {
        "sqlite://".len()
    } else {
        "sqlite:".len()
    };
    match head.rfind('/') {
        Some(idx) if idx >= scheme_len => (&head[..=idx], &head[idx + 1..]),
        _ => head.split_at(scheme_len),
    }
}

/// Hide the password of a connection URL for logging
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|idx| idx + 3) else {
        return url.to_string();
    };
    let authority_end = url[scheme_end..]
        .find('/')
        .map(|idx| scheme_end + idx)
        .unwrap_or(url.len());
    let authority = &url[scheme_end..authority_end];

    match (authority.rfind('@'), authority.find(':')) {
        (Some(at), Some(colon)) if colon < at => format!(
            "{}{}:***{}",
            &url[..scheme_end],
            &authority[..colon],
            &url[scheme_end + at..]
        ),
        _ => url.to_string(),
    }
}
