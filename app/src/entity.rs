pub mod build_metrics;
pub mod code_metrics;
pub mod cve_vulnerability;
pub mod deploy_release_metrics;
pub mod gitleaks_finding;
pub mod operate_monitor_metrics;
pub mod outdated_package;
pub mod plan_metrics;
pub mod project_license;
pub mod repository;
pub mod scan;
pub mod test_metrics;
pub mod zap_alert;
