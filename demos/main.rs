use pbfetch::Api;

#[tokio::main]
async fn main() {
    // Install whatever version the environment or the latest release says
    let result = Api::new()
        .set_install_dir("./pb")
        .repo("pocketbase/pocketbase")
        .latest()
        .ensure()
        .await;

    match result {
        Ok(installed) => println!(
            "pocketbase {} ready at {}",
            installed.version,
            installed.binary_path.display()
        ),
        Err(e) => eprintln!("error installing pocketbase: {e}"),
    }

    // Pin a specific version; a second run is a no-op
    let result = Api::new()
        .set_install_dir("./pb-pinned")
        .repo("pocketbase/pocketbase")
        .version("0.22.0")
        .ensure()
        .await;

    match result {
        Ok(installed) => println!("pinned install state: {:?}", installed.state),
        Err(e) => eprintln!("error installing pocketbase 0.22.0: {e}"),
    }

    // Through a proxy, without a progress bar
    let result = Api::new()
        .set_install_dir("./pb-proxied")
        .set_proxy("http://127.0.0.1:3128")
        .no_progress()
        .repo("pocketbase/pocketbase")
        .version("0.22.0")
        .force(true)
        .ensure()
        .await;

    if let Err(e) = result {
        eprintln!("error installing pocketbase through proxy: {e}");
    }
}
