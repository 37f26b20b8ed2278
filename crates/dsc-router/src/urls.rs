//! Protocol URL grammars.
//!
//! Each function returns the unanchored grammar for one endpoint, with named
//! captures for its parameters. Version 1 endpoints are recognised only so
//! the server can answer them with "not implemented".

use crate::grammar::{
    AGENT_ID, CONFIGURATION_ID, CONFIGURATION_NAME, JOB_ID, MODULE_NAME, MODULE_VERSION,
};

/// `Action(ConfigurationId='…')/ConfigurationContent` (v1 GetConfiguration).
pub fn get_configuration_v1() -> String {
    format!(r"Action\(ConfigurationId='(?P<configuration_id>{CONFIGURATION_ID})'\)\/ConfigurationContent")
}

/// `Module(ConfigurationId='…',ModuleName='…',ModuleVersion='…')/ModuleContent` (v1 GetModule).
pub fn get_module_v1() -> String {
    format!(
        r"Module\(ConfigurationId='(?P<configuration_id>{CONFIGURATION_ID})',ModuleName='(?P<module_name>{MODULE_NAME})',ModuleVersion='(?P<module_version>{MODULE_VERSION})'\)\/ModuleContent"
    )
}

/// `Action(ConfigurationId='…')/GetAction` (v1 GetAction).
pub fn get_action_v1() -> String {
    format!(r"Action\(ConfigurationId='(?P<configuration_id>{CONFIGURATION_ID})'\)\/GetAction")
}

/// `Node(ConfigurationId='…')/SendStatusReport` (v1 SendStatusReport).
pub fn send_status_report_v1() -> String {
    format!(r"Node\(ConfigurationId='(?P<configuration_id>{CONFIGURATION_ID})'\)\/SendStatusReport")
}

/// `Node(ConfigurationId='…')/Reports(JobId='…')` (v1 GetStatusReport).
pub fn get_status_report_v1() -> String {
    format!(
        r"Node\(ConfigurationId='(?P<configuration_id>{CONFIGURATION_ID})'\)\/Reports\(JobId='(?P<job_id>{JOB_ID})'\)"
    )
}

/// `Nodes(AgentId='…')/Configurations(ConfigurationName='…')/ConfigurationContent`.
pub fn get_configuration_v2() -> String {
    format!(
        r"Nodes\(AgentId='(?P<agent_id>{AGENT_ID})'\)\/Configurations\(ConfigurationName='(?P<configuration_name>{CONFIGURATION_NAME})'\)\/ConfigurationContent"
    )
}

/// `Modules(ModuleName='…',ModuleVersion='…')/ModuleContent`.
pub fn get_module_v2() -> String {
    format!(
        r"Modules\(ModuleName='(?P<module_name>{MODULE_NAME})',ModuleVersion='(?P<module_version>{MODULE_VERSION})'\)\/ModuleContent"
    )
}

/// `Nodes(AgentId='…')/GetDscAction`.
pub fn get_dsc_action_v2() -> String {
    format!(r"Nodes\(AgentId='(?P<agent_id>{AGENT_ID})'\)\/GetDscAction")
}

/// `Nodes(AgentId='…')` (RegisterDscAgent).
pub fn register_dsc_agent_v2() -> String {
    format!(r"Nodes\(AgentId='(?P<agent_id>{AGENT_ID})'\)")
}

/// `Nodes(AgentId='…')/SendReport`.
pub fn send_report_v2() -> String {
    format!(r"Nodes\(AgentId='(?P<agent_id>{AGENT_ID})'\)\/SendReport")
}

/// `Nodes(AgentId='…')/Reports(JobId='…')`.
pub fn get_reports_v2() -> String {
    format!(r"Nodes\(AgentId='(?P<agent_id>{AGENT_ID})'\)\/Reports\(JobId='(?P<job_id>{JOB_ID})'\)")
}

/// `Nodes(AgentId='…')/CertificateRotation`.
pub fn certificate_rotation() -> String {
    format!(r"Nodes\(AgentId='(?P<agent_id>{AGENT_ID})'\)\/CertificateRotation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pattern;
    use http::Method;

    const AGENT: &str = "B1F28971-2CEB-46D5-9DCB-79C044395F81";
    const JOB: &str = "6c2b10a4-93d8-4f4e-9a43-2d11d5b0e7c1";

    #[test]
    fn test_every_grammar_compiles() {
        for grammar in [
            get_configuration_v1(),
            get_module_v1(),
            get_action_v1(),
            send_status_report_v1(),
            get_status_report_v1(),
            get_configuration_v2(),
            get_module_v2(),
            get_dsc_action_v2(),
            register_dsc_agent_v2(),
            send_report_v2(),
            get_reports_v2(),
            certificate_rotation(),
        ] {
            assert!(Pattern::new(&grammar).is_ok(), "{grammar}");
        }
    }

    #[test]
    fn test_configuration_content_params() {
        let pattern = Pattern::get(&get_configuration_v2()).unwrap();
        let path = format!(
            "/Nodes(AgentId='{AGENT}')/Configurations(ConfigurationName='ClientConfig2')/ConfigurationContent"
        );
        let params = pattern.matches(&Method::GET, &path).unwrap();
        assert_eq!(params.get("agent_id"), Some(AGENT));
        assert_eq!(params.get("configuration_name"), Some("ClientConfig2"));
    }

    #[test]
    fn test_module_content_with_empty_version() {
        let pattern = Pattern::get(&get_module_v2()).unwrap();
        let params = pattern
            .matches(
                &Method::GET,
                "/Modules(ModuleName='xWebAdministration',ModuleVersion='')/ModuleContent",
            )
            .unwrap();
        assert_eq!(params.get("module_name"), Some("xWebAdministration"));
        assert_eq!(params.get("module_version"), Some(""));

        assert!(pattern
            .matches(
                &Method::GET,
                "/Modules(ModuleName='xWebAdministration',ModuleVersion='1')/ModuleContent",
            )
            .is_none());
    }

    #[test]
    fn test_v1_module_content_captures_version_separately() {
        let pattern = Pattern::get(&get_module_v1()).unwrap();
        let path = format!(
            "/Module(ConfigurationId='{AGENT}',ModuleName='xNetworking',ModuleVersion='2.12.0.0')/ModuleContent"
        );
        let params = pattern.matches(&Method::GET, &path).unwrap();
        assert_eq!(params.get("module_name"), Some("xNetworking"));
        assert_eq!(params.get("module_version"), Some("2.12.0.0"));
    }

    #[test]
    fn test_registration_does_not_match_subresources() {
        let pattern = Pattern::put(&register_dsc_agent_v2()).unwrap();
        assert!(pattern
            .matches(&Method::PUT, &format!("/Nodes(AgentId='{AGENT}')"))
            .is_some());
        assert!(pattern
            .matches(&Method::PUT, &format!("/Nodes(AgentId='{AGENT}')/SendReport"))
            .is_none());
    }

    #[test]
    fn test_reports_params() {
        let pattern = Pattern::get(&get_reports_v2()).unwrap();
        let path = format!("/Nodes(AgentId='{AGENT}')/Reports(JobId='{JOB}')");
        let params = pattern.matches(&Method::GET, &path).unwrap();
        assert_eq!(params.get("job_id"), Some(JOB));
    }
}
