//! Reconciliation Integration Tests
//!
//! Drives whole feed messages through the board service and checks the
//! resulting panels, registry-backed identity and status readout.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use proptest::prelude::*;
use quick_xml::escape::escape;

use quote_board::{
    BoardService, BoardSurface, ConnectionState, FeedSession, IncrementalRenderer, StatusClass,
    TransportEvent,
};

fn connected_board() -> BoardService<BoardSurface> {
    let mut service = BoardService::new(
        FeedSession::new(true),
        Box::new(IncrementalRenderer::new()),
        BoardSurface::new(),
    );
    assert!(service.open());
    service.handle(TransportEvent::Opened);
    service
}

fn send(service: &mut BoardService<BoardSurface>, message: &str) {
    service.handle(TransportEvent::Message(message.to_string()));
}

#[test]
fn first_message_creates_panel() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document><instr sym="AAPL" descr="Apple"><quotes><b p="100" q="10"/></quotes><trades/></instr></document>"#,
    );

    let surface = board.surface();
    assert_eq!(surface.panel_count(), 1);
    let panel = surface.panel("AAPL").unwrap();
    assert_eq!(panel.header.description, "Apple");
    assert_eq!(panel.bids.len(), 1);
    assert_eq!(panel.bids[0].price, "100");
    assert_eq!(panel.bids[0].quantity, "10");
    assert!(panel.asks.is_empty());
    assert!(panel.trades.is_empty());
}

#[test]
fn update_replaces_panel_in_place() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document><instr sym="AAPL" descr="Apple"><quotes><b p="100" q="10"/></quotes></instr></document>"#,
    );
    let before = Arc::clone(board.surface().panel("AAPL").unwrap());

    send(
        &mut board,
        r#"<document><instr sym="AAPL" descr="Apple"><quotes><b p="101" q="5"/></quotes></instr></document>"#,
    );

    let surface = board.surface();
    assert_eq!(surface.panels_for("AAPL"), 1);
    let after = surface.panel("AAPL").unwrap();
    assert!(!Arc::ptr_eq(&before, after));
    assert_eq!(after.bids.len(), 1);
    assert_eq!(after.bids[0].price, "101");
    assert_eq!(after.bids[0].quantity, "5");
}

#[test]
fn identical_update_still_replaces() {
    let mut board = connected_board();
    let message = r#"<document><instr sym="A"><quotes><a p="1" q="1"/></quotes></instr></document>"#;
    send(&mut board, message);
    let before = Arc::clone(board.surface().panel("A").unwrap());

    send(&mut board, message);

    let after = board.surface().panel("A").unwrap();
    assert_eq!(before.as_ref(), after.as_ref());
    assert!(!Arc::ptr_eq(&before, after));
}

#[test]
fn duplicate_symbol_in_one_message_last_wins() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document>
             <instr sym="X"><quotes><b p="1" q="1"/></quotes></instr>
             <instr sym="X"><quotes><b p="2" q="2"/></quotes></instr>
           </document>"#,
    );

    let surface = board.surface();
    assert_eq!(surface.panels_for("X"), 1);
    assert_eq!(surface.panel("X").unwrap().bids[0].price, "2");
    assert_eq!(surface.panel("X").unwrap().bids[0].quantity, "2");
}

#[test]
fn snippet_without_symbol_is_skipped() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document>
             <instr descr="no symbol here"><quotes><b p="1" q="1"/></quotes></instr>
             <instr sym="Y"><quotes><b p="3" q="4"/></quotes></instr>
           </document>"#,
    );

    let surface = board.surface();
    assert_eq!(surface.panel_count(), 1);
    assert!(surface.panel("Y").is_some());
}

#[test]
fn symbols_absent_from_later_messages_keep_panels() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document><instr sym="A"/><instr sym="B"/></document>"#,
    );
    send(
        &mut board,
        r#"<document><instr sym="B"><trades><t p="9" q="1"/></trades></instr></document>"#,
    );

    let order: Vec<&str> = board
        .surface()
        .panels()
        .iter()
        .map(|p| p.symbol())
        .collect();
    assert_eq!(order, vec!["A", "B"]);
    assert_eq!(board.surface().panel("B").unwrap().trades.len(), 1);
}

#[test]
fn status_tracks_messages() {
    let mut board = connected_board();
    assert_eq!(board.surface().status().class, StatusClass::Connected);

    send(&mut board, "<document/>");
    send(&mut board, "<document/>");

    let status = board.status();
    assert_eq!(status.state, ConnectionState::Connected);
    assert_eq!(status.message_count, 2);
    assert_eq!(board.surface().status().class, StatusClass::Connected);
    assert!(board.surface().status().text.contains('2'));
}

#[test]
fn malformed_message_leaves_board_untouched() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document><instr sym="A"><quotes><b p="1" q="1"/></quotes></instr></document>"#,
    );
    send(&mut board, "<document><instr sym=\"A\">");

    assert_eq!(board.status().message_count, 2);
    assert_eq!(board.surface().panel_count(), 1);
    assert_eq!(board.surface().panel("A").unwrap().bids[0].price, "1");
}

#[test]
fn content_after_root_drops_message() {
    let mut board = connected_board();
    send(
        &mut board,
        r#"<document/><document><instr sym="Z"/></document>"#,
    );
    send(
        &mut board,
        r#"<document><instr sym="Z"/></document>trailing junk"#,
    );

    assert_eq!(board.status().message_count, 2);
    assert_eq!(board.surface().panel_count(), 0);
}

#[test]
fn messages_before_open_are_ignored() {
    let mut service = BoardService::new(
        FeedSession::new(true),
        Box::new(IncrementalRenderer::new()),
        BoardSurface::new(),
    );
    service.open();
    send(&mut service, r#"<document><instr sym="A"/></document>"#);

    assert_eq!(service.status().message_count, 0);
    assert_eq!(service.surface().panel_count(), 0);
}

proptest! {
    #[test]
    fn values_pass_through_verbatim(
        price in "[ -~]{0,12}",
        quantity in "[ -~]{0,12}",
    ) {
        let mut board = connected_board();
        let message = format!(
            r#"<document><instr sym="P"><quotes><a p="{}" q="{}"/></quotes></instr></document>"#,
            escape(price.as_str()),
            escape(quantity.as_str()),
        );
        send(&mut board, &message);

        let panel = board.surface().panel("P").unwrap();
        prop_assert_eq!(&panel.asks[0].price, &price);
        prop_assert_eq!(&panel.asks[0].quantity, &quantity);
    }
}
