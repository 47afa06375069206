use anyhow::{Context, Result};
use async_trait::async_trait;
use liveclass_core::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use crate::peer::{LinkState, PeerConnection, PeerEventSender, PeerFactory};

const DATA_CHANNEL_LABEL: &str = "liveclass";

/// Builds `webrtc` peer connections that report trickle ICE candidates and
/// connection state through the session's event channel.
pub struct WebRtcPeerFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl WebRtcPeerFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }

    fn rtc_config(&self) -> RTCConfiguration {
        RTCConfiguration {
            ice_servers: self
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PeerFactory for WebRtcPeerFactory {
    async fn create(&self, events: PeerEventSender) -> Result<Arc<dyn PeerConnection>> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(api.new_peer_connection(self.rtc_config()).await?);

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("Connection to {} is {}", events.remote(), s);
                    if let Some(state) = link_state(s) {
                        events.state_changed(state).await;
                    }
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.local_candidate(from_rtc_candidate(init)).await;
            })
        }));

        let remote = events.remote();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            Box::pin(async move {
                debug!("Data channel '{}' opened by {}", dc.label(), remote);
            })
        }));

        Ok(Arc::new(WebRtcPeer { peer_connection }))
    }
}

pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
}

#[async_trait]
impl PeerConnection for WebRtcPeer {
    async fn create_offer(&self) -> Result<SessionDescription> {
        // An offer without any m-line gathers no candidates.
        self.peer_connection
            .create_data_channel(DATA_CHANNEL_LABEL, None)
            .await
            .context("Failed to create data channel")?;

        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await
            .context("Remote description rejected")?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await
            .context("ICE candidate rejected")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
    };
    rtc.context("Malformed SDP")
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

fn link_state(state: RTCPeerConnectionState) -> Option<LinkState> {
    match state {
        RTCPeerConnectionState::Connecting => Some(LinkState::Connecting),
        RTCPeerConnectionState::Connected => Some(LinkState::Connected),
        RTCPeerConnectionState::Disconnected => Some(LinkState::Disconnected),
        RTCPeerConnectionState::Failed => Some(LinkState::Failed),
        RTCPeerConnectionState::Closed => Some(LinkState::Closed),
        _ => None,
    }
}
