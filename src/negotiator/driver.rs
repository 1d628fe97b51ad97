//! Handshake state machine
//!
//! Drives `Start → MethodSent → (AuthSent) → ConnectSent → Done` over the
//! reactor. Every suspension point registers exactly one read interest and
//! returns; [`dispatch`] is the single readiness entry point, parameterized
//! by the phase whose response is expected. Failures never retry: each
//! terminal outcome finalizes the attempt through the context immediately.

use super::context::NegotiationContext;
use crate::error::{NegotiateError, Socks5Error};
use crate::socks::codec;
use crate::socks::consts::*;
use crate::socks::types::{DetailedStatus, NegotiationStatus};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Handshake phase whose response the next readiness event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Waiting for the method-selection response
    Method,
    /// Waiting for the RFC 1929 auth response
    Auth,
    /// Waiting for the CONNECT response
    Connect,
}

/// Outcome of one phase handler
enum Flow {
    /// The next read interest is registered; wait for it
    Pending,
    /// The proxy granted the CONNECT request
    Granted,
}

/// Send the method request and arm the first read interest and the timer
///
/// A failure of this very first write is reported only through the returned
/// error; the internal terminate suppresses the callback so the caller is
/// not told twice. Every later failure is reported only via the callback.
pub(crate) fn start(ctx: &Arc<NegotiationContext>) -> Result<(), NegotiateError> {
    if !ctx.begin() {
        // A repeated start must not re-send the method request or arm a
        // second read interest or timer.
        return Ok(());
    }
    if ctx.is_terminated() {
        // Canceled before start; nothing to do.
        return Ok(());
    }

    debug!(destination = %ctx.destination(), "starting SOCKS5 negotiation");

    let request = codec::build_method_request(ctx.credentials());
    if let Err(err) = send(ctx, &request) {
        ctx.terminate(
            NegotiationStatus::Error,
            DetailedStatus::new(err.to_string()),
            true,
        );
        return Err(err);
    }

    if register_read(ctx, Phase::Method).is_err() {
        // Reported via the callback, not the return value.
        fail(ctx, NegotiateError::Registration);
        return Ok(());
    }

    if let Some(timeout) = ctx.timeout() {
        let timer_ctx = ctx.clone();
        let timer = ctx.event_manager().register_timer(
            Instant::now() + timeout,
            Box::new(move || {
                timer_ctx.terminate(
                    NegotiationStatus::Error,
                    DetailedStatus::new(NegotiateError::Timeout.to_string()),
                    false,
                );
            }),
        );
        ctx.set_timer(timer);
    }

    Ok(())
}

/// Readiness entry point for all phases
pub(crate) fn dispatch(ctx: &Arc<NegotiationContext>, phase: Phase) {
    if ctx.is_terminated() {
        // Lost the race against a timeout or cancel; the terminate CAS
        // already settled the outcome.
        return;
    }

    trace!(?phase, "socket readable");
    ctx.event_manager().deregister_read(ctx.socket().handle());

    let result = match phase {
        Phase::Method => on_method_response(ctx),
        Phase::Auth => on_auth_response(ctx),
        Phase::Connect => on_connect_response(ctx),
    };

    match result {
        Ok(Flow::Pending) => {}
        Ok(Flow::Granted) => {
            ctx.terminate(
                NegotiationStatus::Success,
                DetailedStatus::new(crate::error::reply_message(SOCKS5_REPLY_SUCCEEDED)),
                false,
            );
        }
        Err(err) => fail(ctx, err),
    }
}

fn on_method_response(ctx: &Arc<NegotiationContext>) -> Result<Flow, NegotiateError> {
    let buf = read_exact(ctx, METHOD_RESPONSE_LEN)?;
    let method = codec::parse_method_response(&buf)?;

    match method {
        SOCKS5_AUTH_METHOD_NONE => {
            debug!("proxy selected no authentication");
            send_connect_request(ctx)
        }
        SOCKS5_AUTH_METHOD_PASSWORD => {
            if !ctx.credentials().is_offered() {
                return Err(Socks5Error::AuthNotOffered.into());
            }
            debug!("proxy selected username/password authentication");
            send_auth_request(ctx)
        }
        SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE => Err(Socks5Error::NoAcceptableMethod.into()),
        other => Err(Socks5Error::UnknownMethod(other).into()),
    }
}

fn send_auth_request(ctx: &Arc<NegotiationContext>) -> Result<Flow, NegotiateError> {
    let request = codec::build_auth_request(ctx.credentials())?;
    send(ctx, &request)?;
    register_read(ctx, Phase::Auth)?;
    Ok(Flow::Pending)
}

fn on_auth_response(ctx: &Arc<NegotiationContext>) -> Result<Flow, NegotiateError> {
    let buf = read_exact(ctx, AUTH_RESPONSE_LEN)?;
    let status = codec::parse_auth_response(&buf)?;
    if status != 0 {
        return Err(Socks5Error::AuthRejected.into());
    }
    debug!("proxy accepted credentials");
    send_connect_request(ctx)
}

fn send_connect_request(ctx: &Arc<NegotiationContext>) -> Result<Flow, NegotiateError> {
    let request = codec::build_connect_request(ctx.destination())?;
    send(ctx, &request)?;
    register_read(ctx, Phase::Connect)?;
    Ok(Flow::Pending)
}

fn on_connect_response(ctx: &Arc<NegotiationContext>) -> Result<Flow, NegotiateError> {
    let header = read_exact(ctx, CONNECT_RESPONSE_HEADER_LEN)?;
    let (rep, atyp) = codec::parse_connect_response_header(&header)?;

    // The bound address and port are consumed to keep the stream cursor
    // correct; their value is discarded.
    match codec::bound_address_len(atyp)? {
        Some(len) => {
            read_exact(ctx, len + PORT_LEN)?;
        }
        None => {
            let len = read_exact(ctx, 1)?[0] as usize;
            read_exact(ctx, len + PORT_LEN)?;
        }
    }

    if rep != SOCKS5_REPLY_SUCCEEDED {
        return Err(NegotiateError::Refused(rep));
    }
    Ok(Flow::Granted)
}

/// Write a whole message with a single non-blocking write
///
/// A short write is a terminal transport error; no accumulation is
/// attempted.
fn send(ctx: &Arc<NegotiationContext>, buf: &[u8]) -> Result<(), NegotiateError> {
    let written = ctx.socket().write(buf)?;
    if written != buf.len() {
        return Err(NegotiateError::Transport(format!(
            "short write: {} of {} bytes",
            written,
            buf.len()
        )));
    }
    Ok(())
}

/// Read exactly `len` bytes with a single non-blocking read
fn read_exact(ctx: &Arc<NegotiationContext>, len: usize) -> Result<Vec<u8>, NegotiateError> {
    let mut buf = vec![0u8; len];
    let read = ctx.socket().read(&mut buf)?;
    if read != len {
        return Err(NegotiateError::Transport(format!(
            "short read: {} of {} bytes",
            read, len
        )));
    }
    Ok(buf)
}

/// Arm the read interest for the next phase
fn register_read(ctx: &Arc<NegotiationContext>, phase: Phase) -> Result<(), NegotiateError> {
    let read_ctx = ctx.clone();
    ctx.event_manager()
        .register_read(
            ctx.socket().handle(),
            Box::new(move || dispatch(&read_ctx, phase)),
        )
        .map_err(|_| NegotiateError::Registration)
}

fn fail(ctx: &Arc<NegotiationContext>, err: NegotiateError) {
    ctx.terminate(
        NegotiationStatus::Error,
        DetailedStatus::new(err.to_string()),
        false,
    );
}
