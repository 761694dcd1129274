//! MCP Tool definitions and handlers
//!
//! Defines the Mailchimp tools and the `ToolRegistry` seam the server
//! dispatches through.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{McpError, Result, ValidationError};
use crate::mailchimp::client::MailchimpClient;
use crate::mcp::types::Tool;

/// Largest page size the Mailchimp API accepts
const MAX_PAGE_SIZE: u32 = 1000;

const MEMBER_STATUSES: &[&str] = &["subscribed", "unsubscribed", "cleaned", "pending", "transactional"];
const CAMPAIGN_STATUSES: &[&str] = &["save", "paused", "schedule", "sending", "sent"];

/// Something that can describe and run tools.
///
/// The server only relies on names and schemas from `list_tools`; tool
/// semantics stay behind `invoke`.
pub trait ToolRegistry: Send + Sync + 'static {
    /// Tools currently advertised to clients
    fn list_tools(&self) -> Vec<Tool>;

    /// Whether `name` is one of the advertised tools
    fn has_tool(&self, name: &str) -> bool {
        self.list_tools().iter().any(|tool| tool.name == name)
    }

    /// Run a tool and return its JSON result
    fn invoke(&self, name: &str, args: Value) -> impl Future<Output = Result<Value>> + Send;
}

/// Mailchimp tool set
pub struct MailchimpTools {
    client: Arc<MailchimpClient>,
    writes_enabled: bool,
}

impl MailchimpTools {
    /// Create the tool set; write tools are only exposed when `writes_enabled`
    pub fn new(client: Arc<MailchimpClient>, writes_enabled: bool) -> Self {
        Self {
            client,
            writes_enabled,
        }
    }

    // ==================== Read Tools ====================

    async fn handle_ping(&self) -> Result<Value> {
        Ok(self.client.get("/ping").await?)
    }

    async fn handle_get_account_info(&self) -> Result<Value> {
        Ok(self.client.get("/").await?)
    }

    async fn handle_list_audiences(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            count: Option<u32>,
            offset: Option<u32>,
        }

        let args: Args = parse_args(args)?;
        let path = with_query("/lists".to_string(), &page_query(args.count, args.offset)?);
        Ok(self.client.get(&path).await?)
    }

    async fn handle_get_audience(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            list_id: String,
        }

        let args: Args = parse_args(args)?;
        let path = format!("/lists/{}", segment("listId", &args.list_id)?);
        Ok(self.client.get(&path).await?)
    }

    async fn handle_list_members(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            list_id: String,
            status: Option<String>,
            count: Option<u32>,
            offset: Option<u32>,
        }

        let args: Args = parse_args(args)?;
        let mut query = page_query(args.count, args.offset)?;
        if let Some(status) = args.status {
            check_one_of("status", &status, MEMBER_STATUSES)?;
            query.push(("status", status));
        }

        let path = with_query(
            format!("/lists/{}/members", segment("listId", &args.list_id)?),
            &query,
        );
        Ok(self.client.get(&path).await?)
    }

    async fn handle_get_member(&self, args: Value) -> Result<Value> {
        let args: MemberArgs = parse_args(args)?;
        Ok(self.client.get(&args.member_path()?).await?)
    }

    async fn handle_list_campaigns(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            status: Option<String>,
            list_id: Option<String>,
            count: Option<u32>,
            offset: Option<u32>,
        }

        let args: Args = parse_args(args)?;
        let mut query = page_query(args.count, args.offset)?;
        if let Some(status) = args.status {
            check_one_of("status", &status, CAMPAIGN_STATUSES)?;
            query.push(("status", status));
        }
        if let Some(list_id) = args.list_id {
            query.push(("list_id", list_id));
        }

        let path = with_query("/campaigns".to_string(), &query);
        Ok(self.client.get(&path).await?)
    }

    async fn handle_get_campaign(&self, args: Value) -> Result<Value> {
        let args: CampaignArgs = parse_args(args)?;
        let path = format!("/campaigns/{}", segment("campaignId", &args.campaign_id)?);
        Ok(self.client.get(&path).await?)
    }

    async fn handle_get_campaign_report(&self, args: Value) -> Result<Value> {
        let args: CampaignArgs = parse_args(args)?;
        let path = format!("/reports/{}", segment("campaignId", &args.campaign_id)?);
        Ok(self.client.get(&path).await?)
    }

    async fn handle_list_templates(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            count: Option<u32>,
            offset: Option<u32>,
        }

        let args: Args = parse_args(args)?;
        let path = with_query("/templates".to_string(), &page_query(args.count, args.offset)?);
        Ok(self.client.get(&path).await?)
    }

    async fn handle_list_automations(&self) -> Result<Value> {
        Ok(self.client.get("/automations").await?)
    }

    async fn handle_list_segments(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            list_id: String,
            count: Option<u32>,
            offset: Option<u32>,
        }

        let args: Args = parse_args(args)?;
        let path = with_query(
            format!("/lists/{}/segments", segment("listId", &args.list_id)?),
            &page_query(args.count, args.offset)?,
        );
        Ok(self.client.get(&path).await?)
    }

    // ==================== Write Tools ====================

    async fn handle_add_member(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            list_id: String,
            email: String,
            status: Option<String>,
            merge_fields: Option<Map<String, Value>>,
            tags: Option<Vec<String>>,
        }

        let args: Args = parse_args(args)?;
        check_email(&args.email)?;
        let status = args.status.unwrap_or_else(|| "subscribed".to_string());
        check_one_of("status", &status, MEMBER_STATUSES)?;

        let mut body = json!({
            "email_address": args.email,
            "status": status,
        });
        if let Some(merge_fields) = args.merge_fields {
            body["merge_fields"] = Value::Object(merge_fields);
        }
        if let Some(tags) = args.tags {
            body["tags"] = json!(tags);
        }

        let path = format!("/lists/{}/members", segment("listId", &args.list_id)?);
        Ok(self.client.post(&path, &body).await?)
    }

    async fn handle_update_member(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            #[serde(flatten)]
            member: MemberArgs,
            status: Option<String>,
            merge_fields: Option<Map<String, Value>>,
        }

        let args: Args = parse_args(args)?;
        let mut body = Map::new();
        if let Some(status) = args.status {
            check_one_of("status", &status, MEMBER_STATUSES)?;
            body.insert("status".to_string(), Value::String(status));
        }
        if let Some(merge_fields) = args.merge_fields {
            body.insert("merge_fields".to_string(), Value::Object(merge_fields));
        }
        if body.is_empty() {
            return Err(ValidationError::MissingField {
                field: "status or mergeFields".to_string(),
            }
            .into());
        }

        let path = args.member.member_path()?;
        Ok(self.client.patch(&path, &Value::Object(body)).await?)
    }

    async fn handle_archive_member(&self, args: Value) -> Result<Value> {
        let args: MemberArgs = parse_args(args)?;
        self.client.delete(&args.member_path()?).await?;
        Ok(json!({
            "archived": true,
            "listId": args.list_id,
            "email": args.email,
        }))
    }

    async fn handle_tag_member(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            #[serde(flatten)]
            member: MemberArgs,
            tags: Vec<String>,
            #[serde(default = "default_true")]
            active: bool,
        }

        let args: Args = parse_args(args)?;
        if args.tags.is_empty() {
            return Err(ValidationError::MissingField {
                field: "tags".to_string(),
            }
            .into());
        }

        let status = if args.active { "active" } else { "inactive" };
        let body = json!({
            "tags": args
                .tags
                .iter()
                .map(|name| json!({"name": name, "status": status}))
                .collect::<Vec<_>>(),
        });

        let path = format!("{}/tags", args.member.member_path()?);
        self.client.post(&path, &body).await?;
        Ok(json!({
            "listId": args.member.list_id,
            "email": args.member.email,
            "tags": args.tags,
            "active": args.active,
        }))
    }

    async fn handle_create_campaign(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            list_id: String,
            subject_line: String,
            from_name: String,
            reply_to: String,
            title: Option<String>,
            preview_text: Option<String>,
        }

        let args: Args = parse_args(args)?;
        check_email(&args.reply_to)?;

        let mut settings = json!({
            "subject_line": args.subject_line,
            "from_name": args.from_name,
            "reply_to": args.reply_to,
        });
        if let Some(title) = args.title {
            settings["title"] = Value::String(title);
        }
        if let Some(preview_text) = args.preview_text {
            settings["preview_text"] = Value::String(preview_text);
        }

        let body = json!({
            "type": "regular",
            "recipients": {"list_id": args.list_id},
            "settings": settings,
        });
        Ok(self.client.post("/campaigns", &body).await?)
    }

    async fn handle_update_campaign(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            campaign_id: String,
            subject_line: Option<String>,
            from_name: Option<String>,
            reply_to: Option<String>,
            title: Option<String>,
            preview_text: Option<String>,
        }

        let args: Args = parse_args(args)?;
        if let Some(reply_to) = &args.reply_to {
            check_email(reply_to)?;
        }

        let settings: Map<String, Value> = [
            ("subject_line", args.subject_line),
            ("from_name", args.from_name),
            ("reply_to", args.reply_to),
            ("title", args.title),
            ("preview_text", args.preview_text),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::String(v))))
        .collect();

        if settings.is_empty() {
            return Err(ValidationError::MissingField {
                field: "at least one campaign setting".to_string(),
            }
            .into());
        }

        let path = format!("/campaigns/{}", segment("campaignId", &args.campaign_id)?);
        Ok(self
            .client
            .patch(&path, &json!({ "settings": settings }))
            .await?)
    }

    async fn handle_delete_campaign(&self, args: Value) -> Result<Value> {
        let args: CampaignArgs = parse_args(args)?;
        let path = format!("/campaigns/{}", segment("campaignId", &args.campaign_id)?);
        self.client.delete(&path).await?;
        Ok(json!({
            "deleted": true,
            "campaignId": args.campaign_id,
        }))
    }

    async fn handle_send_test_email(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            campaign_id: String,
            test_emails: Vec<String>,
            send_type: Option<String>,
        }

        let args: Args = parse_args(args)?;
        if args.test_emails.is_empty() {
            return Err(ValidationError::MissingField {
                field: "testEmails".to_string(),
            }
            .into());
        }
        for email in &args.test_emails {
            check_email(email)?;
        }
        let send_type = args.send_type.unwrap_or_else(|| "html".to_string());
        check_one_of("sendType", &send_type, &["html", "plaintext"])?;

        let path = format!(
            "/campaigns/{}/actions/test",
            segment("campaignId", &args.campaign_id)?
        );
        let body = json!({
            "test_emails": args.test_emails,
            "send_type": send_type,
        });
        self.client.post(&path, &body).await?;
        Ok(json!({
            "sent": true,
            "campaignId": args.campaign_id,
            "recipients": args.test_emails,
        }))
    }
}

impl ToolRegistry for MailchimpTools {
    fn list_tools(&self) -> Vec<Tool> {
        tool_definitions(self.writes_enabled)
    }

    fn has_tool(&self, name: &str) -> bool {
        READ_TOOL_NAMES.contains(&name) || (self.writes_enabled && WRITE_TOOL_NAMES.contains(&name))
    }

    async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        match name {
            "mc_ping" => self.handle_ping().await,
            "mc_getAccountInfo" => self.handle_get_account_info().await,
            "mc_listAudiences" => self.handle_list_audiences(args).await,
            "mc_getAudience" => self.handle_get_audience(args).await,
            "mc_listMembers" => self.handle_list_members(args).await,
            "mc_getMember" => self.handle_get_member(args).await,
            "mc_listCampaigns" => self.handle_list_campaigns(args).await,
            "mc_getCampaign" => self.handle_get_campaign(args).await,
            "mc_getCampaignReport" => self.handle_get_campaign_report(args).await,
            "mc_listTemplates" => self.handle_list_templates(args).await,
            "mc_listAutomations" => self.handle_list_automations().await,
            "mc_listSegments" => self.handle_list_segments(args).await,
            _ if !self.writes_enabled => Err(McpError::UnknownTool {
                name: name.to_string(),
            }
            .into()),
            "mc_addMember" => self.handle_add_member(args).await,
            "mc_updateMember" => self.handle_update_member(args).await,
            "mc_archiveMember" => self.handle_archive_member(args).await,
            "mc_tagMember" => self.handle_tag_member(args).await,
            "mc_createCampaign" => self.handle_create_campaign(args).await,
            "mc_updateCampaign" => self.handle_update_campaign(args).await,
            "mc_deleteCampaign" => self.handle_delete_campaign(args).await,
            "mc_sendTestEmail" => self.handle_send_test_email(args).await,
            _ => Err(McpError::UnknownTool {
                name: name.to_string(),
            }
            .into()),
        }
    }
}

/// Arguments naming a single audience member
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberArgs {
    list_id: String,
    email: String,
}

impl MemberArgs {
    /// The upstream accepts the email address in place of the subscriber hash
    fn member_path(&self) -> Result<String> {
        check_email(&self.email)?;
        Ok(format!(
            "/lists/{}/members/{}",
            segment("listId", &self.list_id)?,
            urlencoding::encode(&self.email.trim().to_lowercase())
        ))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CampaignArgs {
    campaign_id: String,
}

fn default_true() -> bool {
    true
}

// ==================== Argument Helpers ====================

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| {
        McpError::InvalidArguments {
            message: e.to_string(),
        }
        .into()
    })
}

/// Validate an email address
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn check_email(email: &str) -> Result<()> {
    if validate_email(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            email: email.to_string(),
        }
        .into())
    }
}

fn check_one_of(name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidParameter {
            name: name.to_string(),
            message: format!("expected one of {}", allowed.join(", ")),
        }
        .into())
    }
}

/// Percent-encode a path identifier, rejecting empty ones
fn segment(name: &str, id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingField {
            field: name.to_string(),
        }
        .into());
    }
    Ok(urlencoding::encode(id).into_owned())
}

fn page_query(count: Option<u32>, offset: Option<u32>) -> Result<Vec<(&'static str, String)>> {
    let mut query = Vec::new();
    if let Some(count) = count {
        if count == 0 || count > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidParameter {
                name: "count".to_string(),
                message: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            }
            .into());
        }
        query.push(("count", count.to_string()));
    }
    if let Some(offset) = offset {
        query.push(("offset", offset.to_string()));
    }
    Ok(query)
}

fn with_query(path: String, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path;
    }
    let encoded: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    format!("{}?{}", path, encoded.join("&"))
}

// ==================== Tool Definitions ====================

const READ_TOOL_NAMES: &[&str] = &[
    "mc_ping",
    "mc_getAccountInfo",
    "mc_listAudiences",
    "mc_getAudience",
    "mc_listMembers",
    "mc_getMember",
    "mc_listCampaigns",
    "mc_getCampaign",
    "mc_getCampaignReport",
    "mc_listTemplates",
    "mc_listAutomations",
    "mc_listSegments",
];

const WRITE_TOOL_NAMES: &[&str] = &[
    "mc_addMember",
    "mc_updateMember",
    "mc_archiveMember",
    "mc_tagMember",
    "mc_createCampaign",
    "mc_updateCampaign",
    "mc_deleteCampaign",
    "mc_sendTestEmail",
];

/// Descriptors of every tool, write tools only when enabled
pub fn tool_definitions(writes_enabled: bool) -> Vec<Tool> {
    let mut tools = read_tools();
    if writes_enabled {
        tools.extend(write_tools());
    }
    tools
}

fn read_tools() -> Vec<Tool> {
    vec![
        tool_def("mc_ping", "Checks that the Mailchimp API is reachable with the configured key", empty_schema()),
        tool_def("mc_getAccountInfo", "Retrieves details about the Mailchimp account", empty_schema()),
        tool_def("mc_listAudiences", "Lists audiences (lists) in the account", paging_schema(json!({}), &[])),
        tool_def("mc_getAudience", "Retrieves a single audience", list_id_schema()),
        tool_def("mc_listMembers", "Lists members of an audience", list_members_schema()),
        tool_def("mc_getMember", "Retrieves an audience member by email address", member_schema()),
        tool_def("mc_listCampaigns", "Lists campaigns, optionally filtered by status or audience", list_campaigns_schema()),
        tool_def("mc_getCampaign", "Retrieves a single campaign", campaign_id_schema()),
        tool_def("mc_getCampaignReport", "Retrieves the report for a sent campaign", campaign_id_schema()),
        tool_def("mc_listTemplates", "Lists email templates", paging_schema(json!({}), &[])),
        tool_def("mc_listAutomations", "Lists classic automations", empty_schema()),
        tool_def("mc_listSegments", "Lists segments and tags of an audience", paging_schema(list_id_property(), &["listId"])),
    ]
}

fn write_tools() -> Vec<Tool> {
    vec![
        tool_def("mc_addMember", "Adds a new member to an audience", add_member_schema()),
        tool_def("mc_updateMember", "Updates the status or merge fields of an audience member", update_member_schema()),
        tool_def("mc_archiveMember", "Archives an audience member", member_schema()),
        tool_def("mc_tagMember", "Adds or removes tags on an audience member", tag_member_schema()),
        tool_def("mc_createCampaign", "Creates a regular campaign draft for an audience", create_campaign_schema()),
        tool_def("mc_updateCampaign", "Updates the settings of a campaign draft", update_campaign_schema()),
        tool_def("mc_deleteCampaign", "Deletes a campaign", campaign_id_schema()),
        tool_def("mc_sendTestEmail", "Sends a test email for a campaign", send_test_email_schema()),
    ]
}

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

fn list_id_property() -> Value {
    json!({
        "listId": {
            "type": "string",
            "description": "ID of the audience"
        }
    })
}

fn paging_schema(mut properties: Value, required: &[&str]) -> Value {
    properties["count"] = json!({
        "type": "integer",
        "minimum": 1,
        "maximum": MAX_PAGE_SIZE,
        "description": "Number of records to return"
    });
    properties["offset"] = json!({
        "type": "integer",
        "minimum": 0,
        "description": "Number of records to skip"
    });
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn list_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": list_id_property(),
        "required": ["listId"]
    })
}

fn campaign_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "campaignId": {
                "type": "string",
                "description": "ID of the campaign"
            }
        },
        "required": ["campaignId"]
    })
}

fn member_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "listId": {"type": "string", "description": "ID of the audience"},
            "email": {"type": "string", "description": "Email address of the member"}
        },
        "required": ["listId", "email"]
    })
}

fn list_members_schema() -> Value {
    let mut properties = list_id_property();
    properties["status"] = json!({"type": "string", "enum": MEMBER_STATUSES});
    paging_schema(properties, &["listId"])
}

fn list_campaigns_schema() -> Value {
    paging_schema(
        json!({
            "status": {"type": "string", "enum": CAMPAIGN_STATUSES},
            "listId": {"type": "string", "description": "Only campaigns sent to this audience"}
        }),
        &[],
    )
}

fn add_member_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "listId": {"type": "string", "description": "ID of the audience"},
            "email": {"type": "string", "description": "Email address to add"},
            "status": {"type": "string", "enum": MEMBER_STATUSES, "default": "subscribed"},
            "mergeFields": {"type": "object", "description": "Merge field values, e.g. {\"FNAME\": \"Ada\"}"},
            "tags": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["listId", "email"]
    })
}

fn update_member_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "listId": {"type": "string", "description": "ID of the audience"},
            "email": {"type": "string", "description": "Email address of the member"},
            "status": {"type": "string", "enum": MEMBER_STATUSES},
            "mergeFields": {"type": "object"}
        },
        "required": ["listId", "email"]
    })
}

fn tag_member_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "listId": {"type": "string", "description": "ID of the audience"},
            "email": {"type": "string", "description": "Email address of the member"},
            "tags": {"type": "array", "items": {"type": "string"}, "minItems": 1},
            "active": {"type": "boolean", "default": true, "description": "false removes the tags"}
        },
        "required": ["listId", "email", "tags"]
    })
}

fn create_campaign_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "listId": {"type": "string", "description": "Audience the campaign is sent to"},
            "subjectLine": {"type": "string"},
            "fromName": {"type": "string"},
            "replyTo": {"type": "string", "description": "Reply-to email address"},
            "title": {"type": "string", "description": "Internal campaign title"},
            "previewText": {"type": "string"}
        },
        "required": ["listId", "subjectLine", "fromName", "replyTo"]
    })
}

fn update_campaign_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "campaignId": {"type": "string", "description": "ID of the campaign"},
            "subjectLine": {"type": "string"},
            "fromName": {"type": "string"},
            "replyTo": {"type": "string"},
            "title": {"type": "string"},
            "previewText": {"type": "string"}
        },
        "required": ["campaignId"]
    })
}

fn send_test_email_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "campaignId": {"type": "string", "description": "ID of the campaign"},
            "testEmails": {"type": "array", "items": {"type": "string"}, "minItems": 1},
            "sendType": {"type": "string", "enum": ["html", "plaintext"], "default": "html"}
        },
        "required": ["campaignId", "testEmails"]
    })
}
