// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Service stubs are generated from the hand-written prost messages in
// src/rpc/proto.rs, so no protoc is needed at build time.

fn main() {
    let simple_service = tonic_build::manual::Service::builder()
        .name("SimpleService")
        .package("bidirectional")
        .method(
            tonic_build::manual::Method::builder()
                .name("process")
                .route_name("Process")
                .input_type("crate::rpc::proto::DataMessage")
                .output_type("crate::rpc::proto::DataMessage")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[simple_service]);
}
