use crate::display::format_item;
use crate::{
    key_vault_properties, ExportTemplateRequest, GenericResource, ResourceGroup, ResourceId, ResourceManagementClient,
    ResourceManagementError, Settings,
};
use std::io::Write;

const KEY_VAULT_NAME: &str = "azureSampleVault";
const KEY_VAULT_API_VERSION: &str = "2015-06-01";

/// Runs the resource management walkthrough against `settings.resource_group`:
/// list groups, create the group, tag it, put a key vault into it, list
/// resources, export the group's template and finally delete the group.
/// Progress is written to `out`.
pub async fn run_walkthrough<W: Write>(
    client: &mut ResourceManagementClient<'_>,
    settings: &Settings,
    out: &mut W,
) -> Result<(), ResourceManagementError> {
    let group_name = settings.resource_group.as_str();
    let mut group_params = ResourceGroup::new(&settings.location);

    writeln!(out, "List Resource Groups")?;
    for group in client.list_resource_groups().await? {
        write!(out, "{}", format_item(&group))?;
    }

    writeln!(out, "Create Resource Group")?;
    let group = client.create_or_update_resource_group(group_name, &group_params).await?;
    write!(out, "{}", format_item(&group))?;

    writeln!(out, "Modify Resource Group")?;
    group_params = group_params.with_tags(vec![("hello", "world")]);
    let group = client.create_or_update_resource_group(group_name, &group_params).await?;
    write!(out, "{}", format_item(&group))?;

    writeln!(out, "Create a Key Vault via a Generic Resource Put")?;
    let vault_id = ResourceId {
        resource_group_name: group_name,
        provider_namespace: "Microsoft.KeyVault",
        parent_resource_path: "",
        resource_type: "vaults",
        resource_name: KEY_VAULT_NAME,
        api_version: KEY_VAULT_API_VERSION,
    };
    let vault_params = GenericResource::new(&settings.location).with_properties(key_vault_properties(&settings.tenant_id));
    let vault = client.create_or_update_resource(&vault_id, &vault_params).await?;
    writeln!(out, "{}\n", serde_json::to_string_pretty(vault.properties())?)?;

    writeln!(out, "List all of the resources within the group")?;
    for resource in client.list_resources().await? {
        write!(out, "{}", format_item(&resource))?;
    }

    writeln!(out, "Export Resource Group Template")?;
    let export = client
        .export_resource_group_template(group_name, &ExportTemplateRequest::all_resources())
        .await?;
    writeln!(out, "{}\n", serde_json::to_string_pretty(export.template())?)?;

    writeln!(out, "Delete Resource Group")?;
    client.delete_resource_group(group_name).await?;
    writeln!(out, "\nDeleted: {}", group_name)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock_client;
    use crate::AzureEnvironment;
    use mockito::{mock, Matcher};
    use serde_json::json;

    fn settings() -> Settings {
        Settings {
            tenant_id: "tenant".to_owned(),
            client_id: "client".to_owned(),
            client_secret: "secret".to_owned(),
            subscription_id: "walk".to_owned(),
            environment: AzureEnvironment::azure_cloud(),
            location: "shanghai".to_owned(),
            resource_group: "walk-group".to_owned(),
            insecure_skip_tls_verify: false,
        }
    }

    fn path(p: &str) -> Matcher {
        Matcher::Regex(format!(r"^{}(\?.*)?$", p))
    }

    #[tokio::test]
    async fn runs_every_step_in_order() {
        let group_body = |tags: serde_json::Value| {
            json!({
                "id": "/subscriptions/walk/resourceGroups/walk-group",
                "name": "walk-group",
                "location": "shanghai",
                "tags": tags,
                "properties": {"provisioningState": "Succeeded"}
            })
            .to_string()
        };

        let list_groups = mock("GET", path("/subscriptions/walk/resourcegroups"))
            .with_status(200)
            .with_body(r#"{"value":[{"id":"/subscriptions/walk/resourceGroups/existing","name":"existing","location":"shanghai"}]}"#)
            .create();
        let create = mock("PUT", path("/subscriptions/walk/resourcegroups/walk-group"))
            .match_body(Matcher::Json(json!({"location": "shanghai"})))
            .with_status(201)
            .with_body(group_body(json!({})))
            .create();
        let modify = mock("PUT", path("/subscriptions/walk/resourcegroups/walk-group"))
            .match_body(Matcher::Json(json!({"location": "shanghai", "tags": {"hello": "world"}})))
            .with_status(200)
            .with_body(group_body(json!({"hello": "world"})))
            .create();
        let vault = mock(
            "PUT",
            path("/subscriptions/walk/resourcegroups/walk-group/providers/Microsoft.KeyVault/vaults/azureSampleVault"),
        )
        .match_query(Matcher::UrlEncoded("api-version".to_owned(), "2015-06-01".to_owned()))
        .with_status(200)
        .with_body(r#"{"name":"azureSampleVault","location":"shanghai","properties":{"vaultUri":"https://azuresamplevault.vault.azure.net/"}}"#)
        .create();
        let list_resources = mock("GET", path("/subscriptions/walk/resources"))
            .with_status(200)
            .with_body(r#"{"value":[{"name":"azureSampleVault","type":"Microsoft.KeyVault/vaults","location":"shanghai"}]}"#)
            .create();
        let export = mock("POST", path("/subscriptions/walk/resourcegroups/walk-group/exportTemplate"))
            .with_status(200)
            .with_body(r#"{"template":{"contentVersion":"1.0.0.0","resources":[]}}"#)
            .create();
        let delete = mock("DELETE", path("/subscriptions/walk/resourcegroups/walk-group"))
            .with_status(200)
            .create();

        let settings = settings();
        let mut client = mock_client();
        client.subscription_id = "walk";
        let mut out = Vec::new();
        run_walkthrough(&mut client, &settings, &mut out).await.unwrap();

        for m in &[list_groups, create, modify, vault, list_resources, export, delete] {
            m.assert();
        }

        let out = String::from_utf8(out).unwrap();
        let headings = [
            "List Resource Groups",
            "Create Resource Group",
            "Modify Resource Group",
            "Create a Key Vault via a Generic Resource Put",
            "List all of the resources within the group",
            "Export Resource Group Template",
            "Delete Resource Group",
            "\nDeleted: walk-group",
        ];
        let mut cursor = 0;
        for heading in headings.iter() {
            let at = out[cursor..]
                .find(heading)
                .unwrap_or_else(|| panic!("{:?} missing or out of order in:\n{}", heading, out));
            cursor += at + heading.len();
        }
        assert!(out.contains("\tName: existing\n"));
        assert!(out.contains("\tTags: {hello=world}\n"));
        assert!(out.contains("\"vaultUri\": \"https://azuresamplevault.vault.azure.net/\""));
        assert!(out.contains("\"contentVersion\": \"1.0.0.0\""));
    }

    #[tokio::test]
    async fn stops_at_the_first_failure() {
        let _list = mock("GET", path("/subscriptions/walk-fail/resourcegroups"))
            .with_status(401)
            .with_body(r#"{"error":{"code":"InvalidAuthenticationToken","message":"expired"}}"#)
            .create();

        let mut client = mock_client();
        client.subscription_id = "walk-fail";
        let mut out = Vec::new();
        let err = run_walkthrough(&mut client, &settings(), &mut out).await.unwrap_err();
        assert!(matches!(err, ResourceManagementError::ApiError { status: 401, .. }));
        assert_eq!(String::from_utf8(out).unwrap(), "List Resource Groups\n");
    }
}
