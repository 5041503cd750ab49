//! 实体基础 trait

use warden_common::AuditInfo;
use warden_errors::{AppError, AppResult};

/// 实体 trait
pub trait Entity {
    type Id;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
    fn audit_info_mut(&mut self) -> &mut AuditInfo;

    /// 当前版本号
    fn version(&self) -> u64 {
        self.audit_info().version
    }

    /// 记录一次变更并递增版本号
    fn touch(&mut self) {
        self.audit_info_mut().update(None);
    }
}

/// 乐观并发检查：`expected` 为调用方读取时的版本
///
/// 仓储在写入前以存储中的版本作为 `stored` 调用，版本不一致时返回 `Conflict`。
pub fn check_version(entity: &str, expected: u64, stored: u64) -> AppResult<()> {
    if expected != stored {
        return Err(AppError::conflict(format!(
            "{} was modified concurrently (expected version {}, found {})",
            entity, expected, stored
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        id: u32,
        audit_info: AuditInfo,
    }

    impl Entity for Sample {
        type Id = u32;

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    impl AggregateRoot for Sample {
        fn audit_info(&self) -> &AuditInfo {
            &self.audit_info
        }

        fn audit_info_mut(&mut self) -> &mut AuditInfo {
            &mut self.audit_info
        }
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut sample = Sample { id: 7, audit_info: AuditInfo::default() };
        assert_eq!(*sample.id(), 7);
        assert_eq!(sample.version(), 1);

        sample.touch();
        assert_eq!(sample.version(), 2);
    }

    #[test]
    fn test_check_version_conflict() {
        assert!(check_version("Role", 3, 3).is_ok());

        let err = check_version("Role", 2, 3).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), 409);
    }
}
