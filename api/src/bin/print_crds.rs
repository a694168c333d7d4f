use guestbook::all_crds;
use k8s_openapi::List;

fn main() -> serde_json::Result<()> {
    let list = List {
        items: all_crds(),
        ..Default::default()
    };
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
