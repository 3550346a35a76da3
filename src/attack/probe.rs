// SPDX-License-Identifier: PMPL-1.0-or-later

//! TCP helpers shared by the attack modules

use crate::types::HoneypotTarget;
use anyhow::{bail, Context, Result};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Resolve every declared port and keep the ones answering right now.
///
/// Ports that are already closed before an attack starts must not be counted
/// as knocked over by it.
pub(crate) fn reachable(target: &HoneypotTarget, timeout: Duration) -> Result<Vec<SocketAddr>> {
    if target.ports.is_empty() {
        bail!("{} declares no open ports to attack", target.ip);
    }

    let mut addrs = Vec::with_capacity(target.ports.len());
    for port in &target.ports {
        let addr = (target.ip.as_str(), *port)
            .to_socket_addrs()
            .with_context(|| format!("resolving {}:{}", target.ip, port))?
            .next()
            .with_context(|| format!("no address found for {}:{}", target.ip, port))?;
        addrs.push(addr);
    }

    let live = live_ports(&addrs, timeout);
    if live.is_empty() {
        bail!(
            "no port on {} accepted a connection before the attack",
            target.ip
        );
    }
    Ok(live)
}

pub(crate) fn is_alive(addr: &SocketAddr, timeout: Duration) -> bool {
    TcpStream::connect_timeout(addr, timeout).is_ok()
}

pub(crate) fn live_ports(addrs: &[SocketAddr], timeout: Duration) -> Vec<SocketAddr> {
    addrs
        .iter()
        .filter(|addr| is_alive(addr, timeout))
        .copied()
        .collect()
}

pub(crate) fn down_ports(addrs: &[SocketAddr], timeout: Duration) -> Vec<SocketAddr> {
    addrs
        .iter()
        .filter(|addr| !is_alive(addr, timeout))
        .copied()
        .collect()
}

/// Deliver one payload and drain whatever the service answers within `timeout`.
pub(crate) fn send_payload(addr: &SocketAddr, payload: &[u8], timeout: Duration) -> Result<usize> {
    let mut stream = TcpStream::connect_timeout(addr, timeout)
        .with_context(|| format!("connecting to {}", addr))?;
    stream.set_write_timeout(Some(timeout))?;
    stream.set_read_timeout(Some(timeout))?;
    stream
        .write_all(payload)
        .with_context(|| format!("writing {} bytes to {}", payload.len(), addr))?;

    let mut buf = [0_u8; 1024];
    match stream.read(&mut buf) {
        Ok(read) => Ok(read),
        Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
        Err(err) if err.kind() == ErrorKind::ConnectionReset => Ok(0),
        Err(err) => Err(err).with_context(|| format!("reading reply from {}", addr)),
    }
}

pub(crate) fn join_addrs(addrs: &[SocketAddr]) -> String {
    addrs
        .iter()
        .map(|addr| addr.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
