//! SQLite 题库 - 基础设施层
//!
//! 持有唯一的数据库连接，实现 `QuestionRepository`
//!
//! ## 表结构
//! ```sql
//! questions(id, unit, question, marks, course_outcome, bloom_level)
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{BloomLevel, Question, QuestionBank, StoredQuestion};
use crate::services::question_repository::{validate_bank, PoisonedLock, QuestionRepository};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS questions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    unit           TEXT    NOT NULL,
    question       TEXT    NOT NULL,
    marks          INTEGER NOT NULL CHECK (marks > 0),
    course_outcome INTEGER,
    bloom_level    INTEGER
);";

/// SQLite 题库
///
/// 连接放在 Mutex 中，写入与读取互斥，读方不会看到替换了一半的题库
pub struct SqliteQuestionStore {
    conn: Mutex<Connection>,
}

impl SqliteQuestionStore {
    /// 打开（或创建）数据库文件
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| AppError::storage("open", e))?;
        info!("🗄️  题库数据库: {}", path.display());
        Self::with_connection(conn)
    }

    /// 内存数据库
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| AppError::storage("open", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::storage("create_schema", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self, operation: &'static str) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::storage(operation, PoisonedLock(e.to_string())))
    }

    fn read_rows(&self, operation: &'static str) -> AppResult<Vec<StoredQuestion>> {
        let conn = self.lock(operation)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, unit, question, marks, course_outcome, bloom_level
                 FROM questions ORDER BY id",
            )
            .map_err(|e| AppError::storage(operation, e))?;

        let rows = stmt
            .query_map([], row_to_stored)
            .map_err(|e| AppError::storage(operation, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(operation, e))?;
        Ok(rows)
    }
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredQuestion> {
    let marks: i64 = row.get(3)?;
    let course_outcome: Option<i64> = row.get(4)?;
    let bloom_level: Option<i64> = row.get(5)?;

    let bloom_level = bloom_level.and_then(|level| {
        let parsed = u8::try_from(level).ok().and_then(BloomLevel::from_level);
        if parsed.is_none() {
            warn!("忽略无效的 Bloom 等级: {}", level);
        }
        parsed
    });

    Ok(StoredQuestion {
        id: row.get(0)?,
        question: Question {
            unit: row.get(1)?,
            text: row.get(2)?,
            marks: u32::try_from(marks).unwrap_or(0),
            course_outcome: course_outcome.and_then(|co| u32::try_from(co).ok()),
            bloom_level,
        },
    })
}

impl QuestionRepository for SqliteQuestionStore {
    fn replace_all(&self, bank: &QuestionBank) -> AppResult<usize> {
        validate_bank(bank)?;

        let mut conn = self.lock("replace_all")?;
        // 事务未提交时 drop 会自动回滚
        let tx = conn
            .transaction()
            .map_err(|e| AppError::storage("replace_all", e))?;

        tx.execute("DELETE FROM questions", [])
            .map_err(|e| AppError::storage("replace_all", e))?;

        let mut count = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO questions (unit, question, marks, course_outcome, bloom_level)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| AppError::storage("replace_all", e))?;

            for question in bank.questions() {
                stmt.execute(params![
                    question.unit,
                    question.text,
                    question.marks,
                    question.course_outcome,
                    question.bloom_level.map(|b| b.level()),
                ])
                .map_err(|e| AppError::storage("replace_all", e))?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| AppError::storage("replace_all", e))?;

        debug!("SQLite 题库已替换为 {} 道题目", count);
        Ok(count)
    }

    fn group_by_unit_and_marks(&self) -> AppResult<QuestionBank> {
        let rows = self.read_rows("group_by_unit_and_marks")?;
        Ok(rows.into_iter().map(|r| r.question).collect())
    }

    fn list_all(&self) -> AppResult<Vec<StoredQuestion>> {
        self.read_rows("list_all")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::question_repository::bank_of;

    fn sample() -> QuestionBank {
        bank_of(vec![
            Question::new("Unit 1", "Define a set.", 4).with_tags(Some(1), BloomLevel::from_level(1)),
            Question::new("Unit 1", "Prove De Morgan's laws.", 6),
            Question::new("Unit 2", "What is a graph?", 4),
            Question::new("Unit 1", "Define a relation.", 4),
        ])
    }

    #[test]
    fn test_round_trip_keeps_order_and_tags() {
        let store = SqliteQuestionStore::open_in_memory().unwrap();
        assert_eq!(store.replace_all(&sample()).unwrap(), 4);

        let bank = store.group_by_unit_and_marks().unwrap();
        let unit1 = bank.unit("Unit 1").unwrap();
        let texts: Vec<&str> = unit1.bucket(4).iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["Define a set.", "Define a relation."]);
        assert_eq!(unit1.bucket(4)[0].course_outcome, Some(1));
        assert_eq!(unit1.bucket(4)[0].bloom_level, BloomLevel::from_level(1));
        assert_eq!(unit1.bucket(6).len(), 1);

        let rows = store.list_all().unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_replace_all_replaces_previous_batch() {
        let store = SqliteQuestionStore::open_in_memory().unwrap();
        store.replace_all(&sample()).unwrap();
        store
            .replace_all(&bank_of(vec![Question::new("Unit 3", "Only one", 6)]))
            .unwrap();

        let bank = store.group_by_unit_and_marks().unwrap();
        assert_eq!(bank.len(), 1);
        assert!(bank.unit("Unit 1").is_none());
    }

    #[test]
    fn test_rejected_batch_keeps_prior_contents() {
        let store = SqliteQuestionStore::open_in_memory().unwrap();
        store.replace_all(&sample()).unwrap();

        let bad = bank_of(vec![Question::new("Unit 1", "zero marks", 0)]);
        assert!(store.replace_all(&bad).is_err());
        assert_eq!(store.list_all().unwrap().len(), 4);
    }

    #[test]
    fn test_failed_insert_rolls_back_delete() {
        let store = SqliteQuestionStore::open_in_memory().unwrap();
        store.replace_all(&sample()).unwrap();

        store
            .lock("test")
            .unwrap()
            .execute_batch(
                "CREATE TEMP TRIGGER reject_boom BEFORE INSERT ON questions \
                 WHEN NEW.question = 'boom' \
                 BEGIN SELECT RAISE(ABORT, 'boom'); END;",
            )
            .unwrap();

        let batch = bank_of(vec![
            Question::new("Unit 1", "Define a function.", 4),
            Question::new("Unit 2", "What is a tree?", 6),
            Question::new("Unit 2", "boom", 4),
        ]);
        let result = store.replace_all(&batch);
        assert!(matches!(
            result,
            Err(AppError::StorageFailure { operation: "replace_all", .. })
        ));

        let texts: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|row| row.question.text)
            .collect();
        assert_eq!(
            texts,
            vec![
                "Define a set.",
                "Define a relation.",
                "Prove De Morgan's laws.",
                "What is a graph?"
            ]
        );
    }

    #[test]
    fn test_file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("questions.db");

        SqliteQuestionStore::open(&path)
            .unwrap()
            .replace_all(&sample())
            .unwrap();

        let reopened = SqliteQuestionStore::open(&path).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 4);
    }
}
