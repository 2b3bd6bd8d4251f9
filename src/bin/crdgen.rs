//! CRD YAML Generator
//!
//! This binary generates the Kubernetes CRD manifest for the GuestbookEntry
//! resource defined by the guestbook-operator.
//!
//! Usage: cargo run --bin crdgen > config/crd/guestbookentries.yaml

use guestbook_operator::crd::generate_crds;

fn main() -> anyhow::Result<()> {
    for crd in generate_crds()? {
        println!("---");
        print!("{}", crd);
    }
    Ok(())
}
