use axum::response::Html;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Recipe Buddy</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; }
    section { border: 1px solid #ddd; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
    textarea, input, select { width: 100%; margin: 0.25rem 0 0.75rem; }
    .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1rem; }
    .card { border: 1px solid #ccc; border-radius: 8px; padding: 0.75rem; }
    .muted { color: #777; font-size: 0.9rem; }
    .hidden { display: none; }
  </style>
</head>
<body>
  <h1>Recipe Buddy</h1>

  <section>
    <label>Username <input id="username" placeholder="e.g. alex" /></label>
    <button onclick="login()">Log in / create account</button>
    <p id="status" class="muted"></p>
  </section>

  <div id="app" class="hidden">
    <section>
      <h2>Profile</h2>
      <label>Dietary preferences (comma-separated) <input id="diet" /></label>
      <label>Allergies (comma-separated) <input id="allergies" /></label>
      <label>Other constraints <input id="constraints" /></label>
      <button onclick="savePreferences()">Save profile</button>
    </section>

    <section>
      <h2>Your pantry</h2>
      <textarea id="pantry" rows="8" placeholder="one ingredient per line"></textarea>
      <button onclick="savePantry()">Save pantry</button>
    </section>

    <section>
      <h2>What do you want to cook?</h2>
      <label>Meal
        <select id="meal">
          <option>breakfast</option><option>lunch</option><option selected>dinner</option><option>snacks</option>
        </select>
      </label>
      <label>Minutes available <input id="time" type="number" min="5" max="90" step="5" value="25" /></label>
      <label>Mood (comma-separated) <input id="mood" placeholder="comforting, spicy" /></label>
      <label>Constraints for this meal (comma-separated) <input id="requestConstraints" placeholder="one pot, no oven" /></label>
      <label>Must-use ingredients <input id="mustUse" /></label>
      <label>Anything else? <input id="text" placeholder="something warm and quick" /></label>
      <label>How many ideas <input id="count" type="number" min="1" max="5" value="3" /></label>
      <button onclick="recommend()">Suggest recipes</button>
    </section>

    <section>
      <h2>Recommendations <span id="source" class="muted"></span></h2>
      <div id="cards" class="cards"></div>
    </section>
  </div>

<script>
const list = (s) => s.split(/[,\n]/).map((x) => x.trim()).filter(Boolean);
const user = () => encodeURIComponent(document.getElementById("username").value.trim());
const val = (id) => document.getElementById(id).value;
const status = (msg) => { document.getElementById("status").textContent = msg; };

async function call(method, path, body) {
  const res = await fetch(path, {
    method,
    headers: { "Content-Type": "application/json" },
    body: body ? JSON.stringify(body) : undefined,
  });
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  return data;
}

function fill(profile) {
  document.getElementById("diet").value = profile.preferences.join(", ");
  document.getElementById("allergies").value = profile.allergies.join(", ");
  document.getElementById("constraints").value = profile.constraints;
  document.getElementById("pantry").value = profile.pantry.join("\n");
}

async function login() {
  try {
    const profile = await call("POST", "/api/login", { username: val("username") });
    fill(profile);
    document.getElementById("app").classList.remove("hidden");
    status("Logged in as " + profile.username);
  } catch (e) { status(e.message); }
}

async function savePreferences() {
  try {
    fill(await call("PUT", `/api/profiles/${user()}/preferences`, {
      diet: list(val("diet")), allergies: list(val("allergies")), constraints: val("constraints"),
    }));
    status("Profile saved.");
  } catch (e) { status(e.message); }
}

async function savePantry() {
  try {
    fill(await call("PUT", `/api/profiles/${user()}/pantry`, { items: list(val("pantry")) }));
    status("Pantry saved.");
  } catch (e) { status(e.message); }
}

function card(recipe) {
  const el = document.createElement("div");
  el.className = "card";
  const h = document.createElement("h3");
  h.textContent = recipe.title;
  el.appendChild(h);
  const meta = document.createElement("p");
  meta.className = "muted";
  meta.textContent = [recipe.summary, recipe.total_time_minutes ? recipe.total_time_minutes + " min" : "",
    (recipe.tags || []).join(" · ")].filter(Boolean).join(" | ");
  el.appendChild(meta);
  for (const [label, items, tag] of [["Ingredients", recipe.ingredients, "ul"], ["Steps", recipe.steps, "ol"]]) {
    const title = document.createElement("strong");
    title.textContent = label;
    el.appendChild(title);
    const listEl = document.createElement(tag);
    for (const item of items || []) {
      const li = document.createElement("li");
      li.textContent = item;
      listEl.appendChild(li);
    }
    el.appendChild(listEl);
  }
  return el;
}

async function recommend() {
  status("Generating recipes...");
  try {
    const rec = await call("POST", `/api/profiles/${user()}/recommendations`, {
      text: val("text"), meal_type: val("meal"), time_limit_minutes: Number(val("time")),
      mood: list(val("mood")), constraints: list(val("requestConstraints")),
      must_use: list(val("mustUse")), count: Number(val("count")),
    });
    document.getElementById("source").textContent = rec.source === "model" ? "(from the model)" : "(from the pantry generator)";
    const cards = document.getElementById("cards");
    cards.replaceChildren(...rec.recipes.map(card));
    status("");
  } catch (e) { status(e.message); }
}
</script>
</body>
</html>
"#;

/// GET /
pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
