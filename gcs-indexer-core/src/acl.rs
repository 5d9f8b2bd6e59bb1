//! Access control: the configured default ACL policy and the customer-domain fallback.

use tracing::debug;

use crate::config::{DefaultAclConfig, DefaultAclMode};
use crate::contract::DefaultAcl;
use crate::error::ConfigError;
use crate::item::{Item, ItemAcl, Principal};

/// Apply `policy` to `item`; if it declines, grant read access to the whole customer domain.
///
/// After this call the item always has at least one reader or policy-set entry.
pub fn resolve_acl(policy: &dyn DefaultAcl, item: &mut Item) {
    if !policy.apply_to_if_enabled(item) {
        debug!(item = %item.name, "Default ACL not applied, granting customer domain");
        item.acl = Some(ItemAcl::with_readers(vec![Principal::customer()]));
    }
}

/// [`DefaultAcl`] built from the `default_acl` section of the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredDefaultAcl {
    mode: DefaultAclMode,
    acl: ItemAcl,
}

impl ConfiguredDefaultAcl {
    pub fn from_config(config: &DefaultAclConfig) -> Result<Self, ConfigError> {
        let mut readers = Vec::new();
        if config.public {
            readers.push(Principal::customer());
        }
        readers.extend(principals(&config.readers.users, &config.readers.groups));
        let denied_readers = principals(&config.denied.users, &config.denied.groups);
        let acl = ItemAcl {
            readers,
            denied_readers,
            owners: Vec::new(),
        };

        if config.mode != DefaultAclMode::None && acl.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "default_acl.mode is {:?} but no public access, readers or denied readers are configured",
                config.mode
            )));
        }

        Ok(Self {
            mode: config.mode,
            acl,
        })
    }

    pub fn mode(&self) -> DefaultAclMode {
        self.mode
    }

    pub fn acl(&self) -> &ItemAcl {
        &self.acl
    }
}

impl DefaultAcl for ConfiguredDefaultAcl {
    fn apply_to_if_enabled(&self, item: &mut Item) -> bool {
        match self.mode {
            DefaultAclMode::None => false,
            DefaultAclMode::Fallback => {
                if !item.has_acl() {
                    item.acl = Some(self.acl.clone());
                }
                true
            }
            DefaultAclMode::Append => {
                let acl = item.acl.get_or_insert_with(ItemAcl::default);
                merge_into(&mut acl.readers, &self.acl.readers);
                merge_into(&mut acl.denied_readers, &self.acl.denied_readers);
                true
            }
            DefaultAclMode::Override => {
                item.acl = Some(self.acl.clone());
                true
            }
        }
    }
}

fn principals(users: &[String], groups: &[String]) -> Vec<Principal> {
    users
        .iter()
        .cloned()
        .map(Principal::User)
        .chain(groups.iter().cloned().map(Principal::Group))
        .collect()
}

fn merge_into(target: &mut Vec<Principal>, extra: &[Principal]) {
    for p in extra {
        if !target.contains(p) {
            target.push(p.clone());
        }
    }
}
