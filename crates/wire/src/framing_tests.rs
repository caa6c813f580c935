// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::request::Request;
use tokio::io::BufReader;

#[tokio::test]
async fn write_then_read_roundtrips_a_request() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Request::Ping).await.unwrap();
    assert_eq!(buf.last(), Some(&b'\n'));

    let mut reader = BufReader::new(buf.as_slice());
    let decoded: Request = read_frame(&mut reader).await.unwrap().unwrap();
    assert_eq!(decoded, Request::Ping);
}

#[tokio::test]
async fn read_frame_returns_none_on_clean_eof() {
    let mut reader = BufReader::new(&b""[..]);
    let decoded: Option<Request> = read_frame(&mut reader).await.unwrap();
    assert_eq!(decoded, None);
}

#[tokio::test]
async fn multiple_frames_on_one_stream_read_in_order() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Request::Ping).await.unwrap();
    write_frame(&mut buf, &Request::StopAll).await.unwrap();

    let mut reader = BufReader::new(buf.as_slice());
    let first: Request = read_frame(&mut reader).await.unwrap().unwrap();
    let second: Request = read_frame(&mut reader).await.unwrap().unwrap();
    assert_eq!(first, Request::Ping);
    assert_eq!(second, Request::StopAll);
}
