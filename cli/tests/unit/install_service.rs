//! Unit tests for the install service: step order, defaults and abort
//! behaviour, driven through a real `SudoExecutor` over a recording runner.

#![allow(clippy::expect_used)]

use std::path::Path;

use chrono::{TimeZone, Utc};
use puppet_provision::application::services::install::{InstallRequest, install};
use puppet_provision::application::services::platform::resolve;
use puppet_provision::domain::layout::CUSTOM_FACTS_SCRIPT;
use puppet_provision::domain::{
    AgentLayout, OsRelease, ProvisionError, ProvisioningConfig, PuppetConfigInput, validate,
};

use crate::mocks::{MockRepo, RecordingReporter, RecordingRunner, entries, journal, output, sudo};

const TRUSTY_URL: &str = "http://apt.puppetlabs.com/puppetlabs-release-trusty.deb";

fn config(version: Option<&str>) -> ProvisioningConfig {
    validate(PuppetConfigInput {
        environment: Some("e1".to_string()),
        server: Some("puppet".to_string()),
        tags: vec!["a".to_string(), "b".to_string()],
        version: version.map(str::to_string),
        add_operation_tag: true,
        ..PuppetConfigInput::default()
    })
    .expect("valid config")
}

fn ubuntu() -> OsRelease {
    OsRelease::parse(
        "ID=ubuntu\nVERSION_ID=\"14.04\"\nVERSION_CODENAME=trusty\n",
        Some("jessie/sid"),
    )
}

fn layout() -> AgentLayout {
    AgentLayout::new(Path::new("/home/u"))
}

fn request<'a>(config: &'a ProvisioningConfig, layout: &'a AgentLayout) -> InstallRequest<'a> {
    InstallRequest {
        config,
        node_id: "vm_1",
        layout,
        now: Utc
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 0)
            .single()
            .expect("valid time"),
    }
}

#[tokio::test]
async fn test_install_runs_steps_in_order_on_debian() {
    let log = journal();
    let runner = RecordingRunner::new(log.clone());
    let repo = MockRepo::new(log.clone());
    let reporter = RecordingReporter::default();
    let platform = resolve(&ubuntu()).expect("resolves");
    let cfg = config(None);
    let layout = layout();

    let report = install(&platform, &sudo(&runner), &repo, &reporter, &request(&cfg, &layout))
        .await
        .expect("install should succeed");

    let calls = entries(&log);
    assert_eq!(calls.len(), 9, "got: {calls:#?}");
    assert_eq!(calls[0], format!("probe {TRUSTY_URL}"));
    assert_eq!(calls[1], format!("download {TRUSTY_URL}"));
    assert!(calls[2].starts_with("sudo dpkg -i "), "got: {}", calls[2]);
    assert_eq!(calls[3], "sudo apt-get update");
    assert_eq!(calls[4], "sudo apt-get install -y puppet=3.4.3-1puppetlabs1");
    assert_eq!(
        calls[5],
        "sudo mkdir -p /home/u/cloudify/puppet /opt/cloudify/puppet/facts /opt/cloudify/puppet/modules/cloudify"
    );
    assert_eq!(
        calls[6],
        "sudo chmod 700 /home/u/cloudify/puppet /opt/cloudify/puppet/facts /opt/cloudify/puppet/modules/cloudify"
    );
    assert!(calls[7].ends_with(" /opt/cloudify/puppet/facts/cloudify_facts.rb"));
    assert!(calls[8].ends_with(" /etc/puppet/puppet.conf"));

    assert_eq!(report.strategy, "debian");
    assert_eq!(report.repo_url, TRUSTY_URL);
    assert_eq!(report.agent_version.as_deref(), Some("3.4.3-1puppetlabs1"));
    assert_eq!(report.identity.certname, "202403070905-vm_1");
    assert!(
        reporter
            .messages
            .lock()
            .expect("mutex poisoned")
            .iter()
            .any(|m| m == "success: Puppet agent installed")
    );
}

#[tokio::test]
async fn test_install_writes_facts_script_and_rendered_config() {
    let log = journal();
    let runner = RecordingRunner::new(log.clone());
    let repo = MockRepo::new(log);
    let platform = resolve(&ubuntu()).expect("resolves");
    let cfg = config(None);
    let layout = layout();

    install(
        &platform,
        &sudo(&runner),
        &repo,
        &RecordingReporter::default(),
        &request(&cfg, &layout),
    )
    .await
    .expect("install should succeed");

    assert_eq!(
        runner
            .moved_into("/opt/cloudify/puppet/facts/cloudify_facts.rb")
            .as_deref(),
        Some(CUSTOM_FACTS_SCRIPT)
    );
    let conf = runner
        .moved_into("/etc/puppet/puppet.conf")
        .expect("config written");
    assert!(conf.contains("    environment = e1\n"));
    assert!(conf.contains("    server = puppet\n"));
    assert!(conf.contains("    certname = 202403070905-vm_1\n"));
    assert!(conf.contains("    node_name_value = vm_1\n"));
    assert!(conf.contains(":/home/u/cloudify/puppet/modules\n"));
}

#[tokio::test]
async fn test_install_uses_pinned_version() {
    let log = journal();
    let runner = RecordingRunner::new(log.clone());
    let repo = MockRepo::new(log.clone());
    let platform = resolve(&ubuntu()).expect("resolves");
    let cfg = config(Some("3.8.7-1puppetlabs1"));
    let layout = layout();

    install(
        &platform,
        &sudo(&runner),
        &repo,
        &RecordingReporter::default(),
        &request(&cfg, &layout),
    )
    .await
    .expect("install should succeed");

    assert!(
        entries(&log).contains(&"sudo apt-get install -y puppet=3.8.7-1puppetlabs1".to_string())
    );
}

#[tokio::test]
async fn test_install_rhel_adds_extra_packages_without_refresh() {
    let log = journal();
    let runner = RecordingRunner::new(log.clone());
    let repo = MockRepo::new(log.clone());
    let os = OsRelease::parse("ID=\"centos\"\nVERSION_ID=\"7\"\n", None);
    let platform = resolve(&os).expect("resolves");
    let cfg = config(None);
    let layout = layout();
    let reporter = RecordingReporter::default();

    install(&platform, &sudo(&runner), &repo, &reporter, &request(&cfg, &layout))
        .await
        .expect("install should succeed");

    let calls = entries(&log);
    let url = "http://yum.puppetlabs.com/puppetlabs-release-el-7.noarch.rpm";
    assert_eq!(calls[0], format!("probe {url}"));
    assert_eq!(calls[1], format!("sudo rpm -ivh {url}"));
    assert_eq!(calls[2], "sudo yum install -y puppet");
    assert_eq!(calls[3], "sudo yum install -y rubygem-json");
    assert!(calls[4].starts_with("sudo mkdir -p "));
    assert!(
        reporter
            .messages
            .lock()
            .expect("mutex poisoned")
            .iter()
            .any(|m| m.starts_with("warn: no puppet version pinned"))
    );
}

#[tokio::test]
async fn test_install_unreachable_repo_aborts_before_any_command() {
    let log = journal();
    let runner = RecordingRunner::new(log.clone());
    let repo = MockRepo::unreachable(log.clone());
    let platform = resolve(&ubuntu()).expect("resolves");
    let cfg = config(None);
    let layout = layout();

    let err = install(
        &platform,
        &sudo(&runner),
        &repo,
        &RecordingReporter::default(),
        &request(&cfg, &layout),
    )
    .await
    .expect_err("probe failure must abort");

    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::Network { .. })
    ));
    assert_eq!(entries(&log), vec![format!("probe {TRUSTY_URL}")]);
}

#[tokio::test]
async fn test_install_failed_refresh_aborts_remaining_steps() {
    let log = journal();
    let runner = RecordingRunner::new(log.clone())
        .fail_on("apt-get update", output(1, b"", b"permission denied\n"));
    let repo = MockRepo::new(log.clone());
    let platform = resolve(&ubuntu()).expect("resolves");
    let cfg = config(None);
    let layout = layout();

    let err = install(
        &platform,
        &sudo(&runner),
        &repo,
        &RecordingReporter::default(),
        &request(&cfg, &layout),
    )
    .await
    .expect_err("refresh failure must abort");

    let msg = format!("{err:#}");
    assert!(msg.contains("exit status 1"), "got: {msg}");
    assert!(msg.contains("permission denied"), "got: {msg}");
    let calls = entries(&log);
    assert_eq!(calls.last().map(String::as_str), Some("sudo apt-get update"));
    assert!(!calls.iter().any(|c| c.contains("mkdir")));
    assert!(runner.moved_into("/etc/puppet/puppet.conf").is_none());
}
