//! Selective disclosure commands

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use veil_compliance::{ComplianceClient, DisclosureRequest, DisclosureResponse};
use veil_core::{generate_key, key_from_hex};

use super::{emit_json, read_json};
use crate::DiscloseAction;

/// Handle disclose subcommands
pub fn handle(client: &mut ComplianceClient, action: DiscloseAction) -> Result<()> {
    match action {
        DiscloseAction::Create {
            request,
            data,
            key,
            output,
        } => {
            let key = key_from_hex(&key).context("invalid --key")?;
            let request: DisclosureRequest = read_json(&request)?;
            let full_data = match read_json::<Value>(&data)? {
                Value::Object(map) => map,
                _ => bail!("{} must contain a JSON object", data.display()),
            };

            let response = client.create_disclosure(&request, &full_data, &key)?;
            emit_json(&serde_json::to_value(&response)?, output.as_deref())?;
        }

        DiscloseAction::Open { response, key } => {
            let key = key_from_hex(&key).context("invalid --key")?;
            let response: DisclosureResponse = read_json(&response)?;
            let disclosed: Map<String, Value> = ComplianceClient::open_disclosure(&response, &key)?;
            emit_json(&Value::Object(disclosed), None)?;
        }

        DiscloseAction::Keygen => {
            println!("{}", hex::encode(generate_key()?));
        }
    }

    Ok(())
}
