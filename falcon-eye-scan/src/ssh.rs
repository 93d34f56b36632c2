//! `ListUSB(node?)`: enumerates `/dev/video*` on a node over SSH. Output is
//! advisory — the caller still decides what to register as a camera.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PrivateKeyWithHashAlg;

use crate::error::Error;
use crate::types::{SshCredentials, UsbDevice};

struct AcceptAll;

#[async_trait]
impl client::Handler for AcceptAll {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &russh_keys::ssh_key::PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

async fn connect(host: &str, creds: &SshCredentials) -> Result<Handle<AcceptAll>, Error> {
    let config = Arc::new(client::Config {
        inactivity_timeout: Some(Duration::from_secs(10)),
        ..Default::default()
    });
    let mut session = client::connect(config, (host, creds.port), AcceptAll).await?;

    let authenticated = if let Some(path) = &creds.private_key_path {
        let key_pair = russh_keys::load_secret_key(path, None)?;
        session
            .authenticate_publickey(&creds.username, PrivateKeyWithHashAlg::new(Arc::new(key_pair), None)?)
            .await?
    } else if let Some(password) = &creds.password {
        session.authenticate_password(&creds.username, password).await?
    } else {
        return Err(Error::AuthFailed(host.to_string()));
    };

    if !authenticated {
        return Err(Error::AuthFailed(host.to_string()));
    }
    Ok(session)
}

async fn exec(session: &mut Handle<AcceptAll>, command: &str) -> Result<String, Error> {
    let mut channel = session.channel_open_session().await?;
    channel.exec(true, command).await?;

    let mut output = Vec::new();
    while let Some(msg) = channel.wait().await {
        if let ChannelMsg::Data { data } = msg {
            output.extend_from_slice(&data);
        }
    }
    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// Lists `/dev/video*` devices on one node, attaching a `v4l2-ctl` friendly
/// name where the tool is present (best-effort; absence is not an error).
pub async fn list_usb_devices(host: &str, node_name: &str, creds: &SshCredentials) -> Result<Vec<UsbDevice>, Error> {
    let mut session = connect(host, creds).await?;

    let listing = exec(&mut session, "ls -1 /dev/video* 2>/dev/null").await?;
    let mut devices = Vec::new();
    for device_path in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let friendly_name = exec(
            &mut session,
            &format!("v4l2-ctl --device={device_path} --info 2>/dev/null | grep 'Card type' | cut -d: -f2"),
        )
        .await
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

        devices.push(UsbDevice { node_name: node_name.to_string(), device_path: device_path.to_string(), friendly_name });
    }

    let _ = session.disconnect(Disconnect::ByApplication, "", "en").await;
    Ok(devices)
}
