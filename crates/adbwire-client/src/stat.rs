//! File metadata returned by the sync protocol.

use std::fmt;

use adbwire_frame::{LegacyStat, StatV2Record};
use serde::Serialize;

/// `st_mode` bits as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct UnixFileMode(pub u32);

impl UnixFileMode {
    pub const TYPE_MASK: u32 = 0o170000;
    pub const SOCKET: u32 = 0o140000;
    pub const SYMLINK: u32 = 0o120000;
    pub const REGULAR: u32 = 0o100000;
    pub const BLOCK_DEVICE: u32 = 0o060000;
    pub const DIRECTORY: u32 = 0o040000;
    pub const CHAR_DEVICE: u32 = 0o020000;
    pub const FIFO: u32 = 0o010000;

    pub const SET_UID: u32 = 0o4000;
    pub const SET_GID: u32 = 0o2000;
    pub const STICKY: u32 = 0o1000;

    pub const OWNER_READ: u32 = 0o400;
    pub const OWNER_WRITE: u32 = 0o200;
    pub const OWNER_EXECUTE: u32 = 0o100;
    pub const GROUP_READ: u32 = 0o040;
    pub const GROUP_WRITE: u32 = 0o020;
    pub const GROUP_EXECUTE: u32 = 0o010;
    pub const OTHERS_READ: u32 = 0o004;
    pub const OTHERS_WRITE: u32 = 0o002;
    pub const OTHERS_EXECUTE: u32 = 0o001;

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The file-type bits (`S_IFMT`).
    pub const fn file_type(self) -> u32 {
        self.0 & Self::TYPE_MASK
    }

    /// rwx bits for owner, group and others.
    pub const fn permissions(self) -> u32 {
        self.0 & 0o777
    }

    pub const fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub const fn is_dir(self) -> bool {
        self.file_type() == Self::DIRECTORY
    }

    pub const fn is_file(self) -> bool {
        self.file_type() == Self::REGULAR
    }

    pub const fn is_symlink(self) -> bool {
        self.file_type() == Self::SYMLINK
    }

    fn type_char(self) -> char {
        match self.file_type() {
            Self::SOCKET => 's',
            Self::SYMLINK => 'l',
            Self::REGULAR => '-',
            Self::BLOCK_DEVICE => 'b',
            Self::DIRECTORY => 'd',
            Self::CHAR_DEVICE => 'c',
            Self::FIFO => 'p',
            _ => '?',
        }
    }
}

impl From<u32> for UnixFileMode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

/// `ls -l` style rendering, e.g. `drwxr-x--x`.
impl fmt::Display for UnixFileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |bit: u32, c: char| if self.contains(bit) { c } else { '-' };
        let exec = |x: u32, special: u32, set: char, unset: char| {
            match (self.contains(x), self.contains(special)) {
                (true, true) => set,
                (false, true) => unset,
                (true, false) => 'x',
                (false, false) => '-',
            }
        };
        let text: String = [
            self.type_char(),
            flag(Self::OWNER_READ, 'r'),
            flag(Self::OWNER_WRITE, 'w'),
            exec(Self::OWNER_EXECUTE, Self::SET_UID, 's', 'S'),
            flag(Self::GROUP_READ, 'r'),
            flag(Self::GROUP_WRITE, 'w'),
            exec(Self::GROUP_EXECUTE, Self::SET_GID, 's', 'S'),
            flag(Self::OTHERS_READ, 'r'),
            flag(Self::OTHERS_WRITE, 'w'),
            exec(Self::OTHERS_EXECUTE, Self::STICKY, 't', 'T'),
        ]
        .into_iter()
        .collect();
        f.write_str(&text)
    }
}

/// Legacy stat result. Sizes above 4 GiB wrap; there is no error field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub path: String,
    pub mode: UnixFileMode,
    pub size: u32,
    /// Seconds since the Unix epoch.
    pub mtime: u32,
}

impl StatEntry {
    pub(crate) fn from_record(path: String, record: LegacyStat) -> Self {
        Self {
            path,
            mode: UnixFileMode(record.mode),
            size: record.size,
            mtime: record.mtime,
        }
    }
}

/// Stat v2 result. Times are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatV2Entry {
    pub path: String,
    pub mode: UnixFileMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub dev: u64,
    pub ino: u64,
    pub nlink: u32,
}

impl StatV2Entry {
    /// Build an entry, or the sync error the record carries.
    pub(crate) fn from_record(
        path: String,
        record: StatV2Record,
    ) -> std::result::Result<Self, (SyncErrorCode, String)> {
        if record.error != 0 {
            return Err((SyncErrorCode::from_code(record.error), path));
        }
        Ok(Self {
            path,
            mode: UnixFileMode(record.mode),
            uid: record.uid,
            gid: record.gid,
            size: record.size,
            atime: record.atime,
            mtime: record.mtime,
            ctime: record.ctime,
            dev: record.dev,
            ino: record.ino,
            nlink: record.nlink,
        })
    }
}

/// errno values the sync service reports.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorCode {
    EPERM,
    ENOENT,
    EINTR,
    EIO,
    ENOMEM,
    EACCES,
    EFAULT,
    EEXIST,
    ENOTDIR,
    EISDIR,
    EINVAL,
    ENFILE,
    EMFILE,
    ETXTBSY,
    EFBIG,
    ENOSPC,
    EROFS,
    ENAMETOOLONG,
    ELOOP,
    EOVERFLOW,
    Other(u32),
}

impl SyncErrorCode {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::EPERM,
            2 => Self::ENOENT,
            4 => Self::EINTR,
            5 => Self::EIO,
            12 => Self::ENOMEM,
            13 => Self::EACCES,
            14 => Self::EFAULT,
            17 => Self::EEXIST,
            20 => Self::ENOTDIR,
            21 => Self::EISDIR,
            22 => Self::EINVAL,
            23 => Self::ENFILE,
            24 => Self::EMFILE,
            26 => Self::ETXTBSY,
            27 => Self::EFBIG,
            28 => Self::ENOSPC,
            30 => Self::EROFS,
            36 => Self::ENAMETOOLONG,
            40 => Self::ELOOP,
            75 => Self::EOVERFLOW,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::EPERM => 1,
            Self::ENOENT => 2,
            Self::EINTR => 4,
            Self::EIO => 5,
            Self::ENOMEM => 12,
            Self::EACCES => 13,
            Self::EFAULT => 14,
            Self::EEXIST => 17,
            Self::ENOTDIR => 20,
            Self::EISDIR => 21,
            Self::EINVAL => 22,
            Self::ENFILE => 23,
            Self::EMFILE => 24,
            Self::ETXTBSY => 26,
            Self::EFBIG => 27,
            Self::ENOSPC => 28,
            Self::EROFS => 30,
            Self::ENAMETOOLONG => 36,
            Self::ELOOP => 40,
            Self::EOVERFLOW => 75,
            Self::Other(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EPERM => "EPERM",
            Self::ENOENT => "ENOENT",
            Self::EINTR => "EINTR",
            Self::EIO => "EIO",
            Self::ENOMEM => "ENOMEM",
            Self::EACCES => "EACCES",
            Self::EFAULT => "EFAULT",
            Self::EEXIST => "EEXIST",
            Self::ENOTDIR => "ENOTDIR",
            Self::EISDIR => "EISDIR",
            Self::EINVAL => "EINVAL",
            Self::ENFILE => "ENFILE",
            Self::EMFILE => "EMFILE",
            Self::ETXTBSY => "ETXTBSY",
            Self::EFBIG => "EFBIG",
            Self::ENOSPC => "ENOSPC",
            Self::EROFS => "EROFS",
            Self::ENAMETOOLONG => "ENAMETOOLONG",
            Self::ELOOP => "ELOOP",
            Self::EOVERFLOW => "EOVERFLOW",
            Self::Other(_) => "errno",
        }
    }
}

impl fmt::Display for SyncErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_predicates() {
        let dir = UnixFileMode(0o040755);
        assert!(dir.is_dir());
        assert!(!dir.is_file());
        assert_eq!(dir.permissions(), 0o755);

        let link = UnixFileMode(0o120777);
        assert!(link.is_symlink());
        assert!(!link.is_dir());

        let file = UnixFileMode(0o100644);
        assert!(file.is_file());
        assert!(file.contains(UnixFileMode::OWNER_READ | UnixFileMode::OWNER_WRITE));
        assert!(!file.contains(UnixFileMode::OWNER_EXECUTE));
    }

    #[test]
    fn display_matches_ls() {
        assert_eq!(UnixFileMode(0o040755).to_string(), "drwxr-xr-x");
        assert_eq!(UnixFileMode(0o100644).to_string(), "-rw-r--r--");
        assert_eq!(UnixFileMode(0o104755).to_string(), "-rwsr-xr-x");
        assert_eq!(UnixFileMode(0o041777).to_string(), "drwxrwxrwt");
        assert_eq!(UnixFileMode(0o120777).to_string(), "lrwxrwxrwx");
    }

    #[test]
    fn errno_codes_roundtrip() {
        for code in [1, 2, 4, 5, 12, 13, 14, 17, 20, 21, 22, 23, 24, 26, 27, 28, 30, 36, 40, 75] {
            let err = SyncErrorCode::from_code(code);
            assert!(!matches!(err, SyncErrorCode::Other(_)), "{code}");
            assert_eq!(err.code(), code);
        }
        assert_eq!(SyncErrorCode::from_code(99), SyncErrorCode::Other(99));
        assert_eq!(SyncErrorCode::Other(99).to_string(), "errno (99)");
    }

    #[test]
    fn nonzero_error_is_never_an_entry() {
        let record = StatV2Record {
            error: 13,
            mode: 0o100644,
            ..Default::default()
        };
        let (code, path) = StatV2Entry::from_record("/data/x".into(), record).unwrap_err();
        assert_eq!(code, SyncErrorCode::EACCES);
        assert_eq!(path, "/data/x");
    }
}
