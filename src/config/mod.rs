//! Machine configuration model and decoding
//!
//! Decodes the parsed configuration tree into the immutable settings model
//! that drives user-data generation. Decoding is fail-fast: the first
//! missing or mistyped key aborts with an error naming the full dotted path,
//! and nothing is defaulted.

pub mod hocon;
pub mod tree;

pub use self::hocon::load_config_file;

use crate::SeedError;
use tree::{ConfigTree, ValueKind};

/// Top-level group every key path is rooted at.
pub const TOP_LEVEL_GROUP: &str = "cloud_seed";

const CLOUD_INIT_GROUP: &str = "cloud_init_settings";
const BOOTSTRAP_GROUP: &str = "bootstrap_script_settings";

/// One file to provision on the target machine.
///
/// Decoded from one element of a `files_to_write` list; immutable once
/// constructed and consumed exactly once when the document is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FileToWrite {
    /// Destination path, taken as given without normalization.
    pub file_path: String,
    pub owner_username: String,
    pub owner_group: String,
    /// Permission string in octal form, e.g. `"0644"`.
    pub permission_octal: String,
    /// Reserved for template expansion by the deployment tooling; carried
    /// through but never expanded here.
    pub use_mustache_template: bool,
    /// When true, `payload_content` is base64 text rather than plain text.
    pub payload_is_base64: bool,
    pub payload_content: String,
}

impl FileToWrite {
    /// Decode one file entry. All seven fields are required.
    fn from_tree(tree: &dyn ConfigTree) -> Result<Self, SeedError> {
        Ok(Self {
            file_path: tree.get_string("file_path")?,
            owner_username: tree.get_string("owner_username")?,
            owner_group: tree.get_string("owner_group")?,
            permission_octal: tree.get_string("permission_octal")?,
            use_mustache_template: tree.get_bool("use_mustache_template")?,
            payload_is_base64: tree.get_bool("payload_is_base64")?,
            payload_content: tree.get_string("payload_content")?,
        })
    }
}

/// Primary-user and package provisioning intent.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudInitSettings {
    pub user_name: String,
    /// Authorized keys in source order; duplicates are kept.
    pub ssh_authorized_keys: Vec<String>,
    /// Plaintext as given; hashing is the platform's job.
    pub password: String,
    pub packages_to_install: Vec<String>,
    pub byobu_enable: bool,
    pub files_to_write: Vec<FileToWrite>,
}

impl CloudInitSettings {
    fn from_tree(tree: &dyn ConfigTree) -> Result<Self, SeedError> {
        let group = format!("{TOP_LEVEL_GROUP}.{CLOUD_INIT_GROUP}");

        let user_name_key = format!("{group}.user_name");
        let user_name = non_empty(tree.get_string(&user_name_key)?, &user_name_key)?;

        let password_key = format!("{group}.password");
        let password = non_empty(tree.get_string(&password_key)?, &password_key)?;

        Ok(Self {
            user_name,
            password,
            ssh_authorized_keys: tree.get_string_list(&format!("{group}.ssh_authorized_keys"))?,
            byobu_enable: tree.get_bool(&format!("{group}.byobu_enable"))?,
            packages_to_install: tree.get_string_list(&format!("{group}.packages_to_install"))?,
            files_to_write: decode_files(tree, &format!("{group}.files_to_write"))?,
        })
    }
}

/// Companion settings for the self-extracting bootstrap step.
///
/// Decoded alongside the cloud-init settings but not consumed by the
/// user-data pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapScriptSettings {
    pub root_folder: String,
    pub zip_url: String,
    pub zip_root_folder: String,
    pub command_line: Vec<String>,
    pub acceptable_status_codes: Vec<i64>,
    pub files_to_write: Vec<FileToWrite>,
}

impl BootstrapScriptSettings {
    fn from_tree(tree: &dyn ConfigTree) -> Result<Self, SeedError> {
        let group = format!("{TOP_LEVEL_GROUP}.{BOOTSTRAP_GROUP}");

        Ok(Self {
            root_folder: tree.get_string(&format!("{group}.root_folder"))?,
            zip_url: tree.get_string(&format!("{group}.zip_url"))?,
            zip_root_folder: tree.get_string(&format!("{group}.zip_root_folder"))?,
            command_line: tree.get_string_list(&format!("{group}.command_line"))?,
            acceptable_status_codes: tree
                .get_int_list(&format!("{group}.acceptable_status_codes"))?,
            files_to_write: decode_files(tree, &format!("{group}.files_to_write"))?,
        })
    }
}

/// Root aggregate decoded from one config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFileSettings {
    pub cloud_init: CloudInitSettings,
    pub bootstrap_script: BootstrapScriptSettings,
}

impl ConfigFileSettings {
    /// Decode the full settings model from a parsed config tree.
    pub fn from_tree(tree: &dyn ConfigTree) -> Result<Self, SeedError> {
        let cloud_init = CloudInitSettings::from_tree(tree)?;
        let bootstrap_script = BootstrapScriptSettings::from_tree(tree)?;
        Ok(Self {
            cloud_init,
            bootstrap_script,
        })
    }
}

/// Decode a list of file entries, re-keying element errors with the list
/// path and index. The same routine serves both file lists.
fn decode_files(tree: &dyn ConfigTree, list_key: &str) -> Result<Vec<FileToWrite>, SeedError> {
    let entries = tree.get_config_list(list_key)?;
    let mut files = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let file =
            FileToWrite::from_tree(entry).map_err(|e| e.in_list_entry(list_key, index))?;
        files.push(file);
    }
    Ok(files)
}

fn non_empty(value: String, key: &str) -> Result<String, SeedError> {
    if value.is_empty() {
        return Err(SeedError::config_key(
            key,
            ValueKind::String,
            "value must not be empty",
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::hocon::HoconLoader;

    const VALID: &str = r#"
cloud_seed {
  cloud_init_settings {
    user_name = "alice"
    password = "secret"
    ssh_authorized_keys = ["ssh-rsa AAAA one", "ssh-rsa BBBB two", "ssh-rsa AAAA one"]
    byobu_enable = true
    packages_to_install = ["git", "curl"]
    files_to_write = [
      {
        file_path = "/etc/motd"
        owner_username = "root"
        owner_group = "root"
        permission_octal = "0644"
        use_mustache_template = false
        payload_is_base64 = false
        payload_content = "hello"
      },
      {
        file_path = "/opt/app/blob.bin"
        owner_username = "app"
        owner_group = "app"
        permission_octal = "0600"
        use_mustache_template = false
        payload_is_base64 = true
        payload_content = "aGVsbG8="
      }
    ]
  }
  bootstrap_script_settings {
    root_folder = "/opt/bootstrap"
    zip_url = "https://example.com/bootstrap.zip"
    zip_root_folder = "bootstrap-main"
    command_line = ["./install.sh", "--quiet"]
    acceptable_status_codes = [0, 1]
    files_to_write = []
  }
}
"#;

    fn parse(text: &str) -> ::hocon::Hocon {
        HoconLoader::new()
            .load_str(text)
            .and_then(|loader| loader.hocon())
            .unwrap()
    }

    fn decode(text: &str) -> Result<ConfigFileSettings, SeedError> {
        ConfigFileSettings::from_tree(&parse(text))
    }

    #[test]
    fn test_decode_valid_config() {
        let settings = decode(VALID).unwrap();
        let ci = &settings.cloud_init;

        assert_eq!(ci.user_name, "alice");
        assert_eq!(ci.password, "secret");
        // source order, duplicates kept
        assert_eq!(
            ci.ssh_authorized_keys,
            vec!["ssh-rsa AAAA one", "ssh-rsa BBBB two", "ssh-rsa AAAA one"]
        );
        assert!(ci.byobu_enable);
        assert_eq!(ci.packages_to_install, vec!["git", "curl"]);

        assert_eq!(ci.files_to_write.len(), 2);
        let first = &ci.files_to_write[0];
        assert_eq!(first.file_path, "/etc/motd");
        assert_eq!(first.owner_username, "root");
        assert_eq!(first.permission_octal, "0644");
        assert!(!first.payload_is_base64);
        assert_eq!(first.payload_content, "hello");
        assert!(ci.files_to_write[1].payload_is_base64);
    }

    #[test]
    fn test_decode_bootstrap_settings() {
        let settings = decode(VALID).unwrap();
        let bs = &settings.bootstrap_script;

        assert_eq!(bs.root_folder, "/opt/bootstrap");
        assert_eq!(bs.zip_url, "https://example.com/bootstrap.zip");
        assert_eq!(bs.zip_root_folder, "bootstrap-main");
        assert_eq!(bs.command_line, vec!["./install.sh", "--quiet"]);
        assert_eq!(bs.acceptable_status_codes, vec![0, 1]);
        assert!(bs.files_to_write.is_empty());
    }

    #[test]
    fn test_missing_password_fails_with_key_path() {
        let text = VALID.replace(r#"password = "secret""#, "");
        let err = decode(&text).unwrap_err();
        match err {
            SeedError::ConfigKey { key, .. } => {
                assert_eq!(key, "cloud_seed.cloud_init_settings.password");
            }
            other => panic!("expected ConfigKey error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_ssh_keys_fails() {
        let text = VALID.replace(
            r#"ssh_authorized_keys = ["ssh-rsa AAAA one", "ssh-rsa BBBB two", "ssh-rsa AAAA one"]"#,
            "",
        );
        let err = decode(&text).unwrap_err();
        assert!(matches!(err, SeedError::ConfigKey { key, .. }
            if key == "cloud_seed.cloud_init_settings.ssh_authorized_keys"));
    }

    #[test]
    fn test_empty_user_name_fails() {
        let text = VALID.replace(r#"user_name = "alice""#, r#"user_name = """#);
        let err = decode(&text).unwrap_err();
        assert!(matches!(err, SeedError::ConfigKey { key, .. }
            if key == "cloud_seed.cloud_init_settings.user_name"));
    }

    #[test]
    fn test_mistyped_byobu_flag_fails() {
        let text = VALID.replace("byobu_enable = true", r#"byobu_enable = "definitely""#);
        let err = decode(&text).unwrap_err();
        assert!(matches!(err, SeedError::ConfigKey { expected, .. }
            if expected == ValueKind::Boolean));
    }

    #[test]
    fn test_file_entry_missing_field_names_list_index() {
        let text = VALID.replace(r#"owner_group = "app""#, "");
        let err = decode(&text).unwrap_err();
        match err {
            SeedError::ConfigKey { key, .. } => {
                assert_eq!(
                    key,
                    "cloud_seed.cloud_init_settings.files_to_write[1].owner_group"
                );
            }
            other => panic!("expected ConfigKey error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_lists_decode_as_empty() {
        let text = VALID
            .replace(r#"packages_to_install = ["git", "curl"]"#, "packages_to_install = []");
        let settings = decode(&text).unwrap();
        assert!(settings.cloud_init.packages_to_install.is_empty());
    }
}
