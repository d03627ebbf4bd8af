//! The mirror rebuilt from `DOMUpdate` batches must agree with the document
//! after loading and after script-driven mutations.

use anyhow::{Result, anyhow};
use dom::{DOMMirror, Document, MirrorIndex, View as _};
use tokio::sync::mpsc;

const PAGE: &str = r#"<!DOCTYPE html>
<html><head></head>
<body>
  <header class="header"><button id="navToggle"><span></span><span></span></button></header>
  <section id="home" class="hero"><h1>Yellow Flowers</h1></section>
</body></html>"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn mirror_follows_load_and_mutations() -> Result<()> {
    init_logging();
    let mut doc = Document::parse_html(PAGE)?;
    let (sender, receiver) = mpsc::channel(8);
    let (index, state) = MirrorIndex::new();
    let mut mirror = DOMMirror::new(receiver, index);

    sender.send(doc.take_updates()).await?;
    assert!(mirror.update().await?);
    let header = doc
        .query_selector_all(".header")?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("header missing"))?;
    {
        let guard = state.lock().map_err(|_| anyhow!("poisoned"))?;
        assert!(guard.is_loaded());
        assert_eq!(guard.elements_with_class("hero").len(), 1);
        assert_eq!(guard.attribute(header, "class"), Some("header"));
    }

    let body = doc.body().ok_or_else(|| anyhow!("no body"))?;
    let banner = doc.create_element("div");
    doc.set_text_content(banner, "Thanks")?;
    doc.add_class(banner, "form-message")?;
    doc.append_child(body, banner)?;
    doc.set_style_property(header, "box-shadow", "0 2px 20px rgba(0, 0, 0, 0.15)")?;
    sender.send(doc.take_updates()).await?;
    mirror.try_update_sync()?;
    {
        let guard = state.lock().map_err(|_| anyhow!("poisoned"))?;
        assert_eq!(guard.elements_with_class("form-message"), vec![banner]);
        assert_eq!(guard.text_content(banner), "Thanks");
        assert_eq!(
            guard.attribute(header, "style"),
            Some("box-shadow: 0 2px 20px rgba(0, 0, 0, 0.15);")
        );
    }

    doc.remove_node(banner)?;
    sender.send(doc.take_updates()).await?;
    drop(sender);
    assert!(mirror.update().await?);
    assert!(!mirror.update().await?);
    let guard = state.lock().map_err(|_| anyhow!("poisoned"))?;
    assert!(guard.get(banner).is_none());
    assert!(guard.elements_with_class("form-message").is_empty());
    Ok(())
}
