//! # Wire Decoder
//!
//! Turns bytes that just arrived on a stream's source or repair endpoint
//! into a [`Packet`] (design §4.2-§4.3, §4.9): the receive-side inverse of
//! [`crate::sender::packetizer::Packetizer`] composing the same wire
//! format. Bare-RTP streams decode through [`decode_bare`]; streams using
//! the RS8M footer decode through [`decode_rs8m`], which additionally
//! parses the footer into a [`FecView`] so [`super::session::Session`] can
//! feed it to a [`roc_fec::FecReader`].
//!
//! Which endpoint the bytes arrived on (source vs. repair) is not carried
//! on the wire — it is implied by which socket received them — so callers
//! pass `is_repair` explicitly rather than it being derived here.

use roc_core::RocError;
use roc_fec::rs8m::Rs8mFooterParser;
use roc_packet::packet::{FecScheme, FecView, Packet, PacketBuilder};
use roc_packet::slice::Slice;
use roc_rtp::composer::RTP_HEADER_LEN;
use roc_rtp::{NullPayloadParser, PayloadParser, RtpParser};

/// Decode one bare-RTP (no FEC footer) packet.
pub fn decode_bare(data: Slice, samples_per_packet: u32) -> Result<Packet, RocError> {
    let view = RtpParser::parse(&data, &NullPayloadParser, samples_per_packet)?;
    Ok(PacketBuilder::new(data).with_rtp(view).with_audio_role().build())
}

/// Decode one RS8M-footed packet, arriving on either the source or repair
/// endpoint of the stream.
pub fn decode_rs8m(data: Slice, samples_per_packet: u32, is_repair: bool) -> Result<Packet, RocError> {
    let footer_parser = Rs8mFooterParser;
    let view = RtpParser::parse(&data, &footer_parser, samples_per_packet)?;

    let body = data
        .narrow(RTP_HEADER_LEN, data.len() - RTP_HEADER_LEN)
        .ok_or(RocError::BadFormat)?;
    let footer = footer_parser.footer(body.as_bytes())?;

    let fec = FecView {
        scheme: FecScheme::Rs8m,
        source_block_number: footer.source_block_number,
        encoding_symbol_id: footer.encoding_symbol_id as u16,
        source_block_length: footer.source_block_length,
        repair_symbol_count: footer.repair_symbol_count as u16,
        payload: view.payload.clone(),
    };

    let mut builder = PacketBuilder::new(data).with_rtp(view).with_fec(fec);
    builder = if is_repair {
        builder.with_repair_role()
    } else {
        builder.with_audio_role()
    };
    Ok(builder.build())
}
