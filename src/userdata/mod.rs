//! User-data document generation
//!
//! Assembles decoded settings into the ordered cloud-init document and
//! emits it as YAML. The builder fixes the document's key order; the
//! emitter carries that order through unchanged.

pub mod emit;
pub mod payload;
pub mod types;

pub use emit::{CLOUD_CONFIG_MARKER, emit};
pub use types::Node;

use crate::SeedError;
use crate::config::{CloudInitSettings, FileToWrite};

/// Build the cloud-init document for one machine.
pub fn build(settings: &CloudInitSettings) -> Result<Node, SeedError> {
    let packages = settings
        .packages_to_install
        .iter()
        .map(|p| Node::str(p.as_str()))
        .collect();
    let byobu = if settings.byobu_enable {
        "enable"
    } else {
        "disable"
    };

    Ok(Node::Map(vec![
        ("users".to_string(), users_node(settings)),
        ("chpasswd".to_string(), chpasswd_node(settings)),
        ("package_update".to_string(), Node::Bool(true)),
        ("package_upgrade".to_string(), Node::Bool(true)),
        ("packages".to_string(), Node::Seq(packages)),
        ("byobu_by_default".to_string(), Node::str(byobu)),
        (
            "write_files".to_string(),
            write_files_node(&settings.files_to_write)?,
        ),
    ]))
}

/// The `users` list: the platform's default user followed by the configured
/// admin user with shell, sudo, and authorized keys.
fn users_node(settings: &CloudInitSettings) -> Node {
    let keys = settings
        .ssh_authorized_keys
        .iter()
        .map(|k| Node::str(k.as_str()))
        .collect();

    let user = Node::Map(vec![
        ("name".to_string(), Node::str(settings.user_name.as_str())),
        ("groups".to_string(), Node::str("admin")),
        ("shell".to_string(), Node::str("/bin/bash")),
        (
            "sudo".to_string(),
            Node::Seq(vec![Node::str("ALL=(ALL) NOPASSWD:ALL")]),
        ),
        ("ssh-authorized-keys".to_string(), Node::Seq(keys)),
    ]);

    Node::Seq(vec![Node::str("default"), user])
}

fn chpasswd_node(settings: &CloudInitSettings) -> Node {
    let entry = format!("{}:{}", settings.user_name, settings.password);
    Node::Map(vec![
        ("list".to_string(), Node::Seq(vec![Node::Str(entry)])),
        ("expire".to_string(), Node::Bool(false)),
    ])
}

fn write_files_node(files: &[FileToWrite]) -> Result<Node, SeedError> {
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        entries.push(write_file_entry(file)?);
    }
    Ok(Node::Seq(entries))
}

fn write_file_entry(file: &FileToWrite) -> Result<Node, SeedError> {
    let content = payload::transcode(file)?;
    Ok(Node::Map(vec![
        ("path".to_string(), Node::str(file.file_path.as_str())),
        (
            "owner".to_string(),
            Node::Str(format!("{}:{}", file.owner_username, file.owner_group)),
        ),
        (
            "permissions".to_string(),
            Node::str(file.permission_octal.as_str()),
        ),
        ("encoding".to_string(), Node::str("gzip")),
        ("content".to_string(), Node::Binary(content)),
    ]))
}
