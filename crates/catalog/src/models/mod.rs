mod book;
mod file;
mod link;

pub(crate) use self::book::BookRow;
pub(crate) use self::file::FileRow;
pub(crate) use self::link::{LinkRow, group_names};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;

fn timestamp(seconds: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(seconds).or_raise(|| ErrorKind::InvalidData(field))
}
