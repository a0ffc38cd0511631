use crate::errors::Result;
use crate::report::figure::{Figure, FIGURE_HEIGHT, FIGURE_WIDTH, X_AXIS_LABEL, Y_AXIS_LABEL};
use serde_json::{json, Map, Value};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.4.2.min.js";

/// plotly names the first axis pair `x`/`y`, then `x2`/`y2`, ...
fn axis_id(prefix: &str, panel: usize) -> String {
    if panel == 0 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, panel + 1)
    }
}

fn layout_key(prefix: &str, panel: usize) -> String {
    format!("{}axis{}", prefix, if panel == 0 { String::new() } else { (panel + 1).to_string() })
}

/// plotly `{data, layout}` description of the figure.
pub fn plotly_spec(figure: &Figure) -> Value {
    let mut data = Vec::new();
    for (idx, panel) in figure.panels.iter().enumerate() {
        for series in &panel.series {
            let x: Vec<String> = series.points.iter().map(|(d, _)| d.format("%Y-%m-%d").to_string()).collect();
            let y: Vec<Option<f64>> = series.points.iter().map(|(_, v)| *v).collect();
            data.push(json!({
                "type": "scatter",
                "mode": "lines",
                "name": series.name,
                "x": x,
                "y": y,
                "xaxis": axis_id("x", idx),
                "yaxis": axis_id("y", idx),
                "line": { "color": series.color_hex() },
            }));
        }
    }

    let mut layout = Map::new();
    layout.insert("width".to_string(), json!(FIGURE_WIDTH));
    layout.insert("height".to_string(), json!(FIGURE_HEIGHT));
    layout.insert(
        "title".to_string(),
        json!({ "text": figure.title, "x": 0.5, "y": 0.9, "xanchor": "center", "yanchor": "top" }),
    );

    let last = figure.x_label_panel();
    let mut annotations = Vec::new();
    for (idx, (bottom, top)) in figure.panel_domains().into_iter().enumerate() {
        let mut x_axis = json!({
            "anchor": axis_id("y", idx),
            "domain": [0.0, 1.0],
            "showticklabels": idx == last,
        });
        if idx > 0 {
            x_axis["matches"] = json!("x");
        }
        if idx == last {
            x_axis["title"] = json!({ "text": X_AXIS_LABEL });
        }

        let mut y_axis = json!({ "anchor": axis_id("x", idx), "domain": [bottom, top] });
        if idx == figure.y_label_panel() {
            y_axis["title"] = json!({ "text": Y_AXIS_LABEL });
        }

        layout.insert(layout_key("x", idx), x_axis);
        layout.insert(layout_key("y", idx), y_axis);
        annotations.push(json!({
            "text": figure.panels[idx].title,
            "x": 0.5,
            "y": top,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "center",
            "yanchor": "bottom",
            "showarrow": false,
        }));
    }
    layout.insert("annotations".to_string(), Value::Array(annotations));

    json!({ "data": data, "layout": Value::Object(layout) })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone interactive page; plotly.js itself is loaded from the CDN.
pub fn render_html(figure: &Figure) -> Result<String> {
    let spec = plotly_spec(figure);
    // keep "</script>" inside string values from closing the tag
    let data = serde_json::to_string(&spec["data"])?.replace("</", "<\\/");
    let layout = serde_json::to_string(&spec["layout"])?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="chart" style="width:{width}px;height:{height}px;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = escape_html(&figure.title),
        cdn = PLOTLY_CDN,
        width = FIGURE_WIDTH,
        height = FIGURE_HEIGHT,
        data = data,
        layout = layout,
    ))
}
