//! Web UI bundle served by the HTTP server

use crate::system::assets::Asset;

pub static WEB_UI: [Asset; 3] = [
    Asset {
        path: "/index.html",
        content_type: "text/html",
        body: include_bytes!("../web/index.html"),
    },
    Asset {
        path: "/style.css",
        content_type: "text/css",
        body: include_bytes!("../web/style.css"),
    },
    Asset {
        path: "/script.js",
        content_type: "application/javascript",
        body: include_bytes!("../web/script.js"),
    },
];
