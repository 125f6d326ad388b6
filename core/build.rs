fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Central proto repo is at ../../proto/ relative to core/
    let proto_root = "../../proto";
    let disasters_proto = format!("{proto_root}/disasters/v1/disasters.proto");

    println!("cargo:rerun-if-changed={disasters_proto}");

    // Skip proto compilation if source doesn't exist (CI uses pre-generated file)
    if !std::path::Path::new(&disasters_proto).exists() {
        println!("cargo:warning=Proto source not found, using pre-generated file");
        return Ok(());
    }

    // The relay only consumes the feed, so no server stubs.
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .out_dir("src/proto")
        .compile_protos(&[&disasters_proto], &[proto_root])?;

    Ok(())
}
