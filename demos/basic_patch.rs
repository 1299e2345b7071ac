use bytepatch::patch::{ItemIterator, encode_to_vec};
use bytepatch::script;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = b"Hello from source";
    let target = b"Hello from updated target";

    let items = script::edit_script(source, target);
    let patch = encode_to_vec(source, target, &items)?;

    for item in ItemIterator::new(&patch)? {
        let item = item?;
        println!("{} {:?}", item.edit, String::from_utf8_lossy(item.inserted));
    }

    let restored = bytepatch::patch::apply_to_vec(source, &patch)?;
    assert_eq!(restored, target);

    println!(
        "encoded {} bytes -> patch {} bytes ({} items) -> restored {} bytes",
        target.len(),
        patch.len(),
        items.len(),
        restored.len()
    );

    Ok(())
}
