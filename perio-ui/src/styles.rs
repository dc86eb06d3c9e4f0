//! Stylesheet for the chart view. The rules key off the class names the
//! grid hands out, so a renamed band class needs a matching rule here.

/// Id of the `<style>` element the view installs once per document.
pub const STYLE_ID: &str = "perio-ui-styles";

/// Default CSS for the chart along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --perio-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --perio-bg: #ffffff;
  --perio-text: #1f2933;
  --perio-muted: #52606d;
  --perio-border: rgba(148, 163, 184, 0.35);
  --perio-radius: 14px;
  --perio-header-bg: #f8fafc;
  --perio-selected: #2563eb;
  --perio-selected-bg: rgba(37, 99, 235, 0.12);
  --perio-depth-neutral: transparent;
  --perio-depth-healthy: rgba(16, 185, 129, 0.18);
  --perio-depth-healthy-text: #047857;
  --perio-depth-moderate: rgba(245, 158, 11, 0.22);
  --perio-depth-moderate-text: #b45309;
  --perio-depth-severe: rgba(220, 38, 38, 0.2);
  --perio-depth-severe-text: #b42318;
  --perio-flag-active: #dc2626;
  --perio-error-bg: rgba(180, 35, 24, 0.1);
  --perio-error-text: #b42318;
  --perio-info-bg: rgba(6, 118, 71, 0.12);
  --perio-info-text: #067647;
}

.perio-root {
  font-family: var(--perio-font-family);
  background: var(--perio-bg);
  color: var(--perio-text);
  border-radius: var(--perio-radius);
  padding: 24px;
  display: flex;
  flex-direction: column;
  gap: 20px;
  box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08);
}

.perio-header {
  display: flex;
  justify-content: space-between;
  align-items: flex-end;
  gap: 16px;
}

.perio-header h2 {
  margin: 0;
  font-size: 1.25rem;
}

.perio-header p {
  margin: 4px 0 0;
  color: var(--perio-muted);
  font-size: 0.85rem;
}

.perio-actions {
  display: flex;
  gap: 8px;
  align-items: center;
}

.perio-actions button {
  border: 1px solid var(--perio-border);
  background: var(--perio-header-bg);
  border-radius: 999px;
  padding: 6px 16px;
  font-weight: 600;
  cursor: pointer;
}

.perio-actions button:disabled {
  opacity: 0.5;
  cursor: progress;
}

.perio-dirty {
  font-size: 0.75rem;
  color: var(--perio-muted);
}

.perio-arch {
  overflow-x: auto;
}

.perio-arch h3 {
  margin: 0 0 8px;
  font-size: 0.9rem;
  text-transform: uppercase;
  letter-spacing: 0.04em;
  color: var(--perio-muted);
}

.perio-grid {
  border-collapse: collapse;
  font-size: 0.78rem;
  font-variant-numeric: tabular-nums;
}

.perio-grid th,
.perio-grid td {
  border: 1px solid var(--perio-border);
  text-align: center;
  min-width: 18px;
  height: 24px;
  padding: 0 2px;
}

.perio-grid thead th {
  background: var(--perio-header-bg);
  font-weight: 700;
}

.perio-grid th.perio-row-label {
  text-align: left;
  white-space: nowrap;
  padding: 0 8px;
  background: var(--perio-header-bg);
  font-weight: 600;
}

.perio-cell {
  cursor: pointer;
}

.perio-cell.is-selected {
  outline: 2px solid var(--perio-selected);
  outline-offset: -2px;
  background: var(--perio-selected-bg);
}

.perio-cell.depth-healthy { background: var(--perio-depth-healthy); color: var(--perio-depth-healthy-text); }
.perio-cell.depth-moderate { background: var(--perio-depth-moderate); color: var(--perio-depth-moderate-text); font-weight: 600; }
.perio-cell.depth-severe { background: var(--perio-depth-severe); color: var(--perio-depth-severe-text); font-weight: 700; }

.perio-cell.flag-active {
  color: var(--perio-flag-active);
  font-weight: 700;
}

.perio-entry {
  display: flex;
  gap: 10px;
  align-items: center;
  font-size: 0.85rem;
}

.perio-entry input {
  width: 64px;
  padding: 4px 8px;
  border: 1px solid var(--perio-border);
  border-radius: 8px;
}

.perio-legend {
  display: flex;
  gap: 12px;
  flex-wrap: wrap;
  font-size: 0.75rem;
  color: var(--perio-muted);
}

.perio-legend span {
  padding: 2px 8px;
  border-radius: 999px;
}

.perio-summary {
  display: flex;
  flex-wrap: wrap;
  gap: 8px;
}

.perio-stat {
  font-size: 0.78rem;
  background: var(--perio-header-bg);
  border: 1px solid var(--perio-border);
  border-radius: 999px;
  padding: 4px 10px;
  font-weight: 600;
}

.perio-notice {
  border-radius: 10px;
  padding: 8px 12px;
  font-size: 0.85rem;
}

.perio-notice[data-level="error"] { background: var(--perio-error-bg); color: var(--perio-error-text); }
.perio-notice[data-level="info"] { background: var(--perio-info-bg); color: var(--perio-info-text); }

.perio-blocked {
  display: flex;
  flex-direction: column;
  align-items: flex-start;
  gap: 12px;
  padding: 16px;
  border: 1px dashed var(--perio-border);
  border-radius: 10px;
}

.perio-blocked[data-state="failed"] { background: var(--perio-error-bg); color: var(--perio-error-text); }

.perio-blocked ul {
  margin: 0;
  padding-left: 18px;
}

.perio-notes textarea {
  width: 100%;
  min-height: 64px;
  border: 1px solid var(--perio-border);
  border-radius: 10px;
  padding: 8px;
  font: inherit;
}
"#;

/// Adds a `<style id=..>` holding `css` to the document head unless an
/// element with that id is already present.
#[cfg(target_arch = "wasm32")]
pub fn install_stylesheet(
    document: &web_sys::Document,
    style_id: &str,
    css: &str,
) -> Result<(), wasm_bindgen::JsValue> {
    if document.get_element_by_id(style_id).is_some() {
        return Ok(());
    }
    let Some(head) = document.head() else {
        return Err("document has no <head> for the chart styles".into());
    };
    let style = document.create_element("style")?;
    style.set_id(style_id);
    style.set_text_content(Some(css));
    head.append_child(&style)?;
    Ok(())
}
