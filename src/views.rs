//! Server-rendered HTML pages.

use std::fmt::Write;

use crate::dao::{
    models::{Category, ScoreBoard, TeamSlot},
    visit_log::VisitRecord,
};

/// Client script keeping a viewer page in sync with the `/ws` channel.
const LIVE_SCRIPT: &str = r#"<script>
(function () {
  function render(board) {
    ["team1", "team2"].forEach(function (slot) {
      var team = board[slot];
      document.querySelector("[data-name='" + slot + "']").textContent = team.name;
      var total = 0;
      ["red", "white", "gray"].forEach(function (color) {
        total += team.score[color];
        document.querySelector("[data-score='" + slot + "-" + color + "']").textContent = team.score[color];
      });
      document.querySelector("[data-total='" + slot + "']").textContent = total;
    });
    renderWinner(board.winner, board);
  }
  function renderWinner(winner, board) {
    var banner = document.getElementById("winner");
    if (!winner) { banner.hidden = true; banner.textContent = ""; return; }
    var team = board && board[winner];
    banner.textContent = "Winner: " + (team ? team.name : winner);
    banner.hidden = false;
  }
  function connect() {
    var scheme = location.protocol === "https:" ? "wss://" : "ws://";
    var socket = new WebSocket(scheme + location.host + "/ws");
    socket.onmessage = function (message) {
      var frame = JSON.parse(message.data);
      if (frame.event === "score_update") { render(frame.payload.data); }
      if (frame.event === "winner_declared") { renderWinner(frame.payload.winner); }
    };
    socket.onclose = function () { setTimeout(connect, 2000); };
  }
  connect();
})();
</script>"#;

/// Public scoreboard with live updates.
pub fn index_page(board: &ScoreBoard) -> String {
    let mut body = String::from("<h1>Scoreboard</h1>");
    push_winner_banner(&mut body, board);
    push_board_table(&mut body, board);
    body.push_str(LIVE_SCRIPT);
    layout("Scoreboard", &body)
}

/// Admin scoreboard view without the editing form.
pub fn admin_scoreboard_page(board: &ScoreBoard) -> String {
    let mut body = String::from("<h1>Scoreboard (admin)</h1>");
    push_admin_nav(&mut body);
    push_winner_banner(&mut body, board);
    push_board_table(&mut body, board);
    body.push_str(LIVE_SCRIPT);
    layout("Scoreboard (admin)", &body)
}

pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>Admin login</h1>");
    if let Some(error) = error {
        let _ = write!(body, r#"<p class="error">{}</p>"#, escape(error));
    }
    body.push_str(
        r#"<form method="post" action="/admin/login">
<label>Username <input name="username" autocomplete="username"></label>
<label>Password <input name="password" type="password" autocomplete="current-password"></label>
<button type="submit">Log in</button>
</form>"#,
    );
    layout("Admin login", &body)
}

/// Editing form for names and scores, winner buttons and the visit log.
pub fn dashboard_page(board: &ScoreBoard, visits: &[VisitRecord]) -> String {
    let mut body = String::from("<h1>Dashboard</h1>");
    push_admin_nav(&mut body);

    body.push_str(r#"<form method="post" action="/admin/dashboard">"#);
    for slot in TeamSlot::ALL {
        let team = board.team(slot);
        let key = slot.key();
        let _ = write!(
            body,
            r#"<fieldset><legend>{default}</legend><label>Name <input name="{key}_name" value="{name}"></label>"#,
            default = slot.default_name(),
            name = escape(&team.name),
        );
        for category in Category::ALL {
            let _ = write!(
                body,
                r#"<label>{color} <input name="{key}_{color}" type="number" min="0" value="{value}"></label>"#,
                color = category.key(),
                value = team.score.get(category),
            );
        }
        body.push_str("</fieldset>");
    }
    body.push_str(r#"<button type="submit">Save</button></form>"#);

    body.push_str("<h2>Declare winner</h2>");
    for slot in TeamSlot::ALL {
        let _ = write!(
            body,
            r#"<button type="button" onclick="declareWinner('{key}')">{name}</button>"#,
            key = slot.key(),
            name = escape(&board.team(slot).name),
        );
    }
    body.push_str(
        r#"<script>
function declareWinner(winner) {
  fetch("/declare_winner", {
    method: "POST",
    headers: {"Content-Type": "application/json"},
    body: JSON.stringify({winner: winner})
  });
}
</script>"#,
    );

    body.push_str("<h2>Visits</h2>");
    push_visits_table(&mut body, visits);
    layout("Dashboard", &body)
}

pub fn visits_page(visits: &[VisitRecord]) -> String {
    let mut body = String::from("<h1>Visits</h1>");
    push_admin_nav(&mut body);
    push_visits_table(&mut body, visits);
    layout("Visits", &body)
}

fn push_admin_nav(body: &mut String) {
    body.push_str(
        r#"<nav><a href="/admin/dashboard">Dashboard</a> <a href="/admin/scoreboard">Scoreboard</a> <a href="/admin/visits">Visits</a> <a href="/admin/logout">Log out</a></nav>"#,
    );
}

fn push_winner_banner(body: &mut String, board: &ScoreBoard) {
    let label = board.winner.as_deref().map(|winner| {
        let name = TeamSlot::ALL
            .into_iter()
            .find(|slot| slot.key() == winner)
            .map(|slot| board.team(slot).name.as_str())
            .unwrap_or(winner);
        format!("Winner: {}", escape(name))
    });
    match label {
        Some(label) => {
            let _ = write!(body, r#"<p id="winner">{label}</p>"#);
        }
        None => body.push_str(r#"<p id="winner" hidden></p>"#),
    }
}

fn push_board_table(body: &mut String, board: &ScoreBoard) {
    body.push_str("<table><tr><th>Team</th>");
    for category in Category::ALL {
        let _ = write!(body, "<th>{}</th>", category.key());
    }
    body.push_str("<th>Total</th></tr>");

    for slot in TeamSlot::ALL {
        let team = board.team(slot);
        let key = slot.key();
        let _ = write!(
            body,
            r#"<tr><td data-name="{key}">{}</td>"#,
            escape(&team.name)
        );
        for category in Category::ALL {
            let _ = write!(
                body,
                r#"<td data-score="{key}-{}">{}</td>"#,
                category.key(),
                team.score.get(category)
            );
        }
        let _ = write!(
            body,
            r#"<td data-total="{key}">{}</td></tr>"#,
            team.score.total()
        );
    }
    body.push_str("</table>");
}

fn push_visits_table(body: &mut String, visits: &[VisitRecord]) {
    if visits.is_empty() {
        body.push_str("<p>No visits logged yet.</p>");
        return;
    }

    body.push_str(
        "<table><tr><th>Time</th><th>Event</th><th>User agent</th><th>Screen</th><th>IP</th>\
         <th>Location</th><th>Lat</th><th>Lon</th><th>ISP</th><th>Timezone</th></tr>",
    );
    for visit in visits {
        body.push_str("<tr>");
        for cell in [
            &visit.time,
            &visit.event,
            &visit.user_agent,
            &visit.screen,
            &visit.ip,
            &visit.location,
            &visit.lat,
            &visit.lon,
            &visit.isp,
            &visit.timezone,
        ] {
            let _ = write!(body, "<td>{}</td>", escape(cell));
        }
        body.push_str("</tr>");
    }
    body.push_str("</table>");
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
