//! Bootstrap page generation
//!
//! Builds the self-contained HTML document rendered inside the browser: a
//! pinned fabric.js build, a canvas sized to the request, and an inline
//! script that loads the scene and reports back through the CDP binding
//! registered by the renderer.

/// Pinned fabric.js release loaded by the bootstrap page
pub const FABRIC_CDN_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/fabric.js/5.3.1/fabric.min.js";

/// Name of the binding the page calls once rendering finished or failed
pub const COMPLETION_BINDING: &str = "__sceneshotDone";

/// Selector for the element that is screenshotted
pub const CANVAS_CONTAINER_SELECTOR: &str = "#canvas-container";

// Token-substituted rather than format!-ed so the embedded script needs no
// brace escaping.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html><html><head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<script src="{{FABRIC_URL}}"></script>
<style>
  body { margin: 0; background: transparent; }
  #canvas-container { display: inline-block; }
  canvas { display: block; }
</style></head><body>
<div id="canvas-container">
  <canvas id="scene-canvas" width="{{WIDTH}}" height="{{HEIGHT}}"></canvas>
</div>
<script>
(function () {
  var done = function (payload) {
    if (window.{{DONE}}) { window.{{DONE}}(JSON.stringify(payload)); }
  };
  try {
    var canvas = new fabric.Canvas('scene-canvas', {
      width: {{WIDTH}},
      height: {{HEIGHT}},
      selection: false,
      interactive: false
    });
    var sceneData = {{SCENE}};
    canvas.loadFromJSON(sceneData, function () {
      canvas.renderAll();
      done({ ok: true });
    });
  } catch (e) {
    done({ ok: false, error: String(e) });
  }
})();
</script></body></html>"#;

/// Serialize the scene as a literal that is safe to embed in script text.
///
/// `serde_json` leaves `<` unescaped, so a string value containing
/// `</script>` could otherwise terminate the surrounding script element.
fn embed_scene_literal(scene: &serde_json::Value) -> String {
    serde_json::to_string(scene)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}

/// Generate the bootstrap document for one render request
pub fn bootstrap_html(scene: &serde_json::Value, width: u32, height: u32) -> String {
    PAGE_TEMPLATE
        .replace("{{FABRIC_URL}}", FABRIC_CDN_URL)
        .replace("{{DONE}}", COMPLETION_BINDING)
        .replace("{{WIDTH}}", &width.to_string())
        .replace("{{HEIGHT}}", &height.to_string())
        .replace("{{SCENE}}", &embed_scene_literal(scene))
}
