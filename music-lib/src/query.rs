//! Dynamic SQL for the songs table
//!
//! Turns sparse [`Song`] / [`SongPartial`] values into parameterized
//! statements. User values only ever travel as bound arguments; the SQL text
//! holds column names, operators and `$n` placeholders.
//!
//! Placeholder numbers come from [`Params::bind`], which returns `$n` for the
//! argument it just pushed, so text and argument order cannot drift apart.

use crate::models::{Song, SongId, SongPartial};
use crate::pagination::Pagination;
use music_lib_common::{Error, Result};

/// Postgres pattern matching [`crate::models::RELEASE_DATE_FORMAT`]
pub const SQL_DATE_FORMAT: &str = "DD.MM.YYYY";

/// Columns read back for every song row
///
/// Nullable columns are coalesced so row mapping always sees strings.
pub const SELECT_COLUMNS: &str = "id, \
     COALESCE(name, '') AS name, \
     COALESCE(artist, '') AS artist, \
     COALESCE(TO_CHAR(release_date, 'DD.MM.YYYY'), '') AS release_date, \
     COALESCE(text, '') AS text, \
     COALESCE(link, '') AS link";

/// Lyrics lookup by id
pub const SELECT_TEXT_BY_ID: &str = "SELECT text FROM songs WHERE id = $1";

/// Delete by id
pub const DELETE_BY_ID: &str = "DELETE FROM songs WHERE id = $1";

/// Single-row lookup by id
pub fn select_by_id() -> String {
    format!("SELECT {} FROM songs WHERE id = $1", SELECT_COLUMNS)
}

/// Song columns a builder can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Artist,
    ReleaseDate,
    Text,
    Link,
}

impl Column {
    /// SQL column name
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Artist => "artist",
            Column::ReleaseDate => "release_date",
            Column::Text => "text",
            Column::Link => "link",
        }
    }

    /// Value expression for a placeholder; dates are parsed server side
    fn value_expr(self, placeholder: &str) -> String {
        match self {
            Column::ReleaseDate => format!("TO_DATE({}, '{}')", placeholder, SQL_DATE_FORMAT),
            _ => placeholder.to_string(),
        }
    }
}

/// A bound statement argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryArg {
    Text(String),
    Integer(i64),
}

/// Positional argument accumulator
#[derive(Debug, Default)]
struct Params {
    args: Vec<QueryArg>,
}

impl Params {
    /// Push an argument and return its placeholder
    fn bind(&mut self, arg: QueryArg) -> String {
        self.args.push(arg);
        format!("${}", self.args.len())
    }

    fn bind_text(&mut self, value: &str) -> String {
        self.bind(QueryArg::Text(value.to_string()))
    }
}

/// Statement text plus its arguments in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<QueryArg>,
}

/// INSERT pieces: column list, value expressions, arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub columns: Vec<&'static str>,
    pub values: Vec<String>,
    pub args: Vec<QueryArg>,
}

impl InsertStatement {
    /// `INSERT ... VALUES ... RETURNING id`
    pub fn into_query(self) -> BuiltQuery {
        BuiltQuery {
            sql: format!(
                "INSERT INTO songs ({}) VALUES ({}) RETURNING id",
                self.columns.join(", "),
                self.values.join(", ")
            ),
            args: self.args,
        }
    }
}

/// WHERE predicates and their arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterClause {
    pub predicates: Vec<String>,
    pub args: Vec<QueryArg>,
}

impl FilterClause {
    /// `WHERE a AND b`, or empty when nothing filters
    pub fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.predicates.join(" AND "))
        }
    }
}

fn song_fields(song: &Song) -> [(Column, &str); 5] {
    [
        (Column::Name, song.name.as_str()),
        (Column::Artist, song.artist.as_str()),
        (Column::ReleaseDate, song.release_date.as_str()),
        (Column::Text, song.text.as_str()),
        (Column::Link, song.link.as_str()),
    ]
}

fn partial_fields(song: &SongPartial) -> [(Column, Option<&str>); 5] {
    [
        (Column::Name, song.name.as_deref()),
        (Column::Artist, song.artist.as_deref()),
        (Column::ReleaseDate, song.release_date.as_deref()),
        (Column::Text, song.text.as_deref()),
        (Column::Link, song.link.as_deref()),
    ]
}

/// Escape LIKE metacharacters so the filter value matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build an INSERT from the non-empty fields of `song`
///
/// A song with every field empty is rejected rather than rendered as an
/// empty column list.
pub fn build_insert(song: &Song) -> Result<InsertStatement> {
    if song.is_blank() {
        return Err(Error::InvalidInput("no fields to insert".to_string()));
    }

    let mut params = Params::default();
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for (column, value) in song_fields(song) {
        if value.is_empty() {
            continue;
        }
        let placeholder = params.bind_text(value);
        columns.push(column.as_str());
        values.push(column.value_expr(&placeholder));
    }

    Ok(InsertStatement {
        columns,
        values,
        args: params.args,
    })
}

/// Build WHERE predicates from the non-empty fields of `filter`
///
/// Text columns use case-insensitive substring match; the release date
/// matches exactly. An empty string cannot filter for empty values.
pub fn build_filter(filter: &Song) -> FilterClause {
    let mut params = Params::default();
    let mut predicates = Vec::new();

    for (column, value) in song_fields(filter) {
        if value.is_empty() {
            continue;
        }
        let predicate = match column {
            Column::ReleaseDate => {
                let placeholder = params.bind_text(value);
                format!("release_date = {}", column.value_expr(&placeholder))
            }
            _ => {
                let placeholder = params.bind_text(&escape_like(value));
                format!(
                    "LOWER({}) LIKE LOWER('%' || {} || '%')",
                    column.as_str(),
                    placeholder
                )
            }
        };
        predicates.push(predicate);
    }

    FilterClause {
        predicates,
        args: params.args,
    }
}

/// Filtered, paginated listing ordered by id (insertion order)
pub fn build_select_all(filter: &Song, pagination: Pagination) -> BuiltQuery {
    let clause = build_filter(filter);
    let where_sql = clause.where_sql();

    // Continue numbering after the filter arguments
    let mut params = Params { args: clause.args };
    let limit = params.bind(QueryArg::Integer(pagination.limit));
    let offset = params.bind(QueryArg::Integer(pagination.offset()));

    let mut sql = format!("SELECT {} FROM songs", SELECT_COLUMNS);
    if !where_sql.is_empty() {
        sql.push(' ');
        sql.push_str(&where_sql);
    }
    sql.push_str(&format!(" ORDER BY id LIMIT {} OFFSET {}", limit, offset));

    BuiltQuery {
        sql,
        args: params.args,
    }
}

/// Build an UPDATE assigning every present field of `song`
///
/// Present-but-empty fields are assigned; an empty release date clears the
/// column to NULL, which reads back as "". The row id is the final argument.
/// Fails with [`Error::NoFieldsSpecified`] when nothing is present.
pub fn build_update(id: SongId, song: &SongPartial) -> Result<BuiltQuery> {
    let mut params = Params::default();
    let mut assignments = Vec::new();

    for (column, value) in partial_fields(song) {
        let Some(value) = value else { continue };
        if column == Column::ReleaseDate && value.is_empty() {
            assignments.push(format!("{} = NULL", column.as_str()));
            continue;
        }
        let placeholder = params.bind_text(value);
        assignments.push(format!("{} = {}", column.as_str(), column.value_expr(&placeholder)));
    }

    if assignments.is_empty() {
        return Err(Error::NoFieldsSpecified);
    }

    let id_placeholder = params.bind(QueryArg::Integer(i64::from(id)));

    Ok(BuiltQuery {
        sql: format!(
            "UPDATE songs SET {} WHERE id = {}",
            assignments.join(", "),
            id_placeholder
        ),
        args: params.args,
    })
}
