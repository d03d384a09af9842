pub fn build_main_ui_html() -> String {
    MAIN_UI_HTML.to_string()
}

const MAIN_UI_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Prompt Studio</title>
  <style>
    :root {
      --bg: #16171b;
      --panel: #1f2126;
      --line: #3a3e46;
      --input-bg: #272a2f;
      --text: #e8eaf0;
      --muted: #8b90a0;
      --accent: #7aa2f7;
      --accent-soft: rgba(122, 162, 247, 0.14);
      --danger: #f7768e;
    }
    body[data-theme="light"] {
      --bg: #f4f5f7;
      --panel: #ffffff;
      --line: #d4d7dd;
      --input-bg: #eef0f3;
      --text: #23252b;
      --muted: #6a6f7d;
      --accent: #2f5fd0;
      --accent-soft: rgba(47, 95, 208, 0.10);
      --danger: #c23a52;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      color: var(--text);
      background: var(--bg);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      font-size: 14px;
    }
    .layout { display: flex; height: 100vh; }
    .sidebar {
      width: 190px;
      flex-shrink: 0;
      border-right: 1px solid var(--line);
      background: var(--panel);
      padding: 14px 10px;
      display: flex;
      flex-direction: column;
      gap: 4px;
    }
    .brand {
      font-size: 17px;
      font-weight: 700;
      letter-spacing: 0.03em;
      padding: 4px 10px 14px;
    }
    .nav-item {
      border: none;
      border-radius: 8px;
      background: transparent;
      color: var(--muted);
      text-align: left;
      padding: 9px 10px;
      font-size: 14px;
      cursor: pointer;
    }
    .nav-item:hover { color: var(--text); background: var(--accent-soft); }
    .nav-item.active { color: var(--accent); background: var(--accent-soft); font-weight: 600; }
    .content { flex: 1; display: flex; flex-direction: column; min-width: 0; }
    .topbar {
      display: flex;
      align-items: center;
      justify-content: space-between;
      border-bottom: 1px solid var(--line);
      background: var(--panel);
      padding: 10px 18px;
    }
    #view-title { margin: 0; font-size: 16px; font-weight: 600; }
    .views { flex: 1; overflow: auto; padding: 18px; }
    .view.hidden { display: none; }
    .panel {
      border: 1px solid var(--line);
      border-radius: 10px;
      background: var(--panel);
      padding: 14px;
      margin-bottom: 16px;
    }
    .panel h2 { margin: 0 0 12px; font-size: 15px; }
    .selector-row {
      display: grid;
      grid-template-columns: 110px 1fr;
      gap: 10px;
      align-items: center;
      margin-bottom: 10px;
    }
    .selector-row label { color: var(--muted); }
    select, input[type="text"], textarea {
      width: 100%;
      border: 1px solid var(--line);
      border-radius: 7px;
      background: var(--input-bg);
      color: var(--text);
      padding: 7px 9px;
      font-size: 14px;
      font-family: inherit;
    }
    textarea { resize: vertical; min-height: 72px; line-height: 1.5; }
    .btn {
      border: 1px solid var(--accent);
      border-radius: 7px;
      background: transparent;
      color: var(--accent);
      padding: 7px 14px;
      font-size: 13px;
      font-weight: 600;
      cursor: pointer;
    }
    .btn:hover { background: var(--accent-soft); }
    .btn.primary { background: var(--accent); color: var(--panel); }
    .btn-row { display: flex; gap: 8px; margin-top: 10px; flex-wrap: wrap; }
    .field-grid {
      display: grid;
      grid-template-columns: repeat(3, minmax(0, 1fr));
      gap: 10px;
      margin: 10px 0;
    }
    .field-grid label { display: block; color: var(--muted); margin-bottom: 4px; font-size: 12px; }
    .library-list { list-style: none; margin: 0; padding: 0; }
    .library-list li {
      border: 1px solid var(--line);
      border-radius: 7px;
      background: var(--input-bg);
      padding: 8px 10px;
      margin-bottom: 8px;
      display: flex;
      gap: 10px;
      align-items: center;
    }
    .library-list .prompt {
      flex: 1;
      min-width: 0;
      overflow: hidden;
      text-overflow: ellipsis;
      white-space: nowrap;
    }
    .library-empty { color: var(--muted); }
    .gallery-toolbar { display: flex; gap: 8px; margin-bottom: 14px; }
    .gallery-grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(210px, 1fr));
      gap: 14px;
    }
    .gallery-card {
      border: 1px solid var(--line);
      border-radius: 10px;
      background: var(--panel);
      overflow: hidden;
      display: flex;
      flex-direction: column;
    }
    .gallery-card img {
      width: 100%;
      height: 130px;
      object-fit: cover;
      background: var(--input-bg);
    }
    .card-body { padding: 10px; display: flex; flex-direction: column; gap: 6px; flex: 1; }
    .card-title { font-weight: 600; }
    .card-tag { color: var(--accent); font-size: 12px; }
    .card-prompt {
      color: var(--muted);
      font-size: 12px;
      line-height: 1.4;
      flex: 1;
    }
    .gallery-empty { color: var(--muted); padding: 24px; border: 1px dashed var(--line); border-radius: 10px; }
    .browser-bar { display: flex; gap: 8px; margin-bottom: 12px; }
    .browser-bar input { flex: 1; }
    .browser-frame-wrap {
      position: relative;
      border: 1px solid var(--line);
      border-radius: 10px;
      overflow: hidden;
      height: calc(100vh - 170px);
      background: var(--panel);
    }
    #browser-frame { width: 100%; height: 100%; border: none; background: #fff; }
    #browser-placeholder {
      position: absolute;
      inset: 0;
      display: flex;
      align-items: center;
      justify-content: center;
      color: var(--muted);
    }
    #browser-placeholder.hidden { display: none; }
    #toast {
      position: fixed;
      left: 50%;
      bottom: 26px;
      transform: translateX(-50%) translateY(8px);
      background: var(--text);
      color: var(--bg);
      border-radius: 8px;
      padding: 10px 18px;
      font-size: 13px;
      box-shadow: 0 4px 18px rgba(0, 0, 0, 0.35);
      opacity: 0;
      pointer-events: none;
      transition: opacity 0.18s ease, transform 0.18s ease;
      z-index: 10;
    }
    #toast.visible { opacity: 1; transform: translateX(-50%) translateY(0); }
  </style>
</head>
<body data-theme="dark">
  <div class="layout">
    <aside class="sidebar">
      <div class="brand">Prompt Studio</div>
      <button class="nav-item active" data-view="builder">Prompt Builder</button>
      <button class="nav-item" data-view="gallery">Gallery</button>
      <button class="nav-item" data-view="browser">Browser</button>
    </aside>
    <div class="content">
      <header class="topbar">
        <h1 id="view-title">Prompt Builder</h1>
        <button id="theme-toggle" class="btn">Theme</button>
      </header>
      <main class="views">
        <section id="builder-view" class="view">
          <div class="panel">
            <h2>Selectors</h2>
            <div id="selector-rows"></div>
            <textarea id="preview-output" readonly spellcheck="false"></textarea>
            <div class="btn-row">
              <button id="copy-preview" class="btn primary">Copy</button>
              <button id="save-preview" class="btn">Save to library</button>
            </div>
          </div>
          <div class="panel">
            <h2>Enhance</h2>
            <input id="free-text" type="text" placeholder="Describe your idea (Korean or English)" />
            <div class="field-grid">
              <div>
                <label for="negative-input">Exclude</label>
                <input id="negative-input" type="text" placeholder="blurry, text" />
              </div>
              <div>
                <label for="aspect-select">Aspect ratio</label>
                <select id="aspect-select">
                  <option value="">Default</option>
                  <option value="--ar 1:1">--ar 1:1</option>
                  <option value="--ar 16:9">--ar 16:9</option>
                  <option value="--ar 9:16">--ar 9:16</option>
                </select>
              </div>
              <div>
                <label for="engine-select">Engine</label>
                <select id="engine-select">
                  <option value="">Any</option>
                  <option value="Midjourney">Midjourney</option>
                  <option value="DALL-E">DALL-E</option>
                  <option value="Stable Diffusion">Stable Diffusion</option>
                </select>
              </div>
            </div>
            <div class="btn-row">
              <button id="enhance-btn" class="btn primary">Enhance</button>
            </div>
            <textarea id="composed-output" readonly spellcheck="false" placeholder="Enhanced prompt appears here"></textarea>
            <div class="btn-row">
              <button id="copy-composed" class="btn primary">Copy</button>
              <button id="save-composed" class="btn">Save to library</button>
            </div>
          </div>
          <div class="panel">
            <h2>Recent prompts</h2>
            <ul id="library-list" class="library-list"></ul>
            <div class="btn-row">
              <button id="open-library" class="btn">Open library page</button>
            </div>
          </div>
        </section>
        <section id="gallery-view" class="view hidden">
          <div class="gallery-toolbar">
            <button id="gallery-refresh" class="btn primary">Shuffle</button>
            <button id="gallery-toggle" class="btn">Show all</button>
          </div>
          <div id="gallery-grid" class="gallery-grid"></div>
        </section>
        <section id="browser-view" class="view hidden">
          <div class="browser-bar">
            <input id="url-input" type="text" placeholder="example.com" />
            <button id="go-btn" class="btn primary">Go</button>
          </div>
          <div class="browser-frame-wrap">
            <iframe id="browser-frame" title="embedded page"></iframe>
            <div id="browser-placeholder">Enter a URL above to browse.</div>
          </div>
        </section>
      </main>
    </div>
  </div>
  <div id="toast"></div>
  <script>
    const TOAST_MS = 3000;
    const REVEAL_MS = 12;

    const viewTitles = {
      builder: "Prompt Builder",
      gallery: "Gallery",
      browser: "Browser",
    };

    let toastTimer = null;
    let revealTimer = null;
    let lastComposed = "";
    let lastNoticeSeq = 0;

    const el = (id) => document.getElementById(id);

    function showToast(message) {
      if (!message) return;
      const toast = el("toast");
      toast.textContent = message;
      // A new toast always pre-empts the pending hide of the previous one.
      if (toastTimer) {
        clearTimeout(toastTimer);
      }
      toast.classList.add("visible");
      toastTimer = setTimeout(() => {
        toast.classList.remove("visible");
        toastTimer = null;
      }, TOAST_MS);
    }

    function revealComposed(text) {
      const output = el("composed-output");
      // Cancel any running reveal before starting a new one, otherwise two
      // animations interleave their characters.
      if (revealTimer) {
        clearInterval(revealTimer);
        revealTimer = null;
      }
      if (!text) {
        output.value = "";
        return;
      }
      let position = 0;
      output.value = "";
      revealTimer = setInterval(() => {
        position += 1;
        output.value = text.slice(0, position);
        if (position >= text.length) {
          clearInterval(revealTimer);
          revealTimer = null;
        }
      }, REVEAL_MS);
    }

    async function api(path, payload) {
      const options = payload === undefined
        ? { method: "GET" }
        : {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify(payload),
          };
      let data = {};
      try {
        const res = await fetch(path, options);
        data = await res.json();
      } catch (_) {
        showToast("The studio backend is not responding.");
        return null;
      }
      if (!data.ok) {
        showToast(data.error || "Something went wrong.");
        return null;
      }
      return data;
    }

    function renderSelectors(rows) {
      const host = el("selector-rows");
      host.innerHTML = "";
      for (const row of rows) {
        const wrap = document.createElement("div");
        wrap.className = "selector-row";

        const label = document.createElement("label");
        label.textContent = row.label;
        wrap.appendChild(label);

        const select = document.createElement("select");
        for (const choice of row.choices) {
          const option = document.createElement("option");
          option.value = choice;
          option.textContent = choice;
          if (choice === row.selected) option.selected = true;
          select.appendChild(option);
        }
        select.addEventListener("change", async () => {
          const data = await api("/app/select", { axis: row.key, value: select.value });
          if (data) applySnapshot(data);
        });
        wrap.appendChild(select);
        host.appendChild(wrap);
      }
    }

    function renderLibrary(prompts) {
      const list = el("library-list");
      list.innerHTML = "";
      if (!prompts.length) {
        const li = document.createElement("li");
        li.className = "library-empty";
        li.textContent = "No saved prompts yet.";
        list.appendChild(li);
        return;
      }
      for (const prompt of prompts) {
        const li = document.createElement("li");

        const text = document.createElement("span");
        text.className = "prompt";
        text.textContent = prompt;
        text.title = prompt;
        li.appendChild(text);

        const copy = document.createElement("button");
        copy.className = "btn";
        copy.textContent = "Copy";
        copy.addEventListener("click", () => copyPrompt(prompt));
        li.appendChild(copy);

        list.appendChild(li);
      }
    }

    function renderGallery(items, expanded) {
      el("gallery-toggle").textContent = expanded ? "Show fewer" : "Show all";
      const grid = el("gallery-grid");
      grid.innerHTML = "";
      if (!items.length) {
        const empty = document.createElement("div");
        empty.className = "gallery-empty";
        empty.textContent = "The gallery catalog is empty.";
        grid.appendChild(empty);
        return;
      }
      for (const item of items) {
        const card = document.createElement("div");
        card.className = "gallery-card";

        const img = document.createElement("img");
        img.src = item.image;
        img.alt = item.title;
        img.loading = "lazy";
        card.appendChild(img);

        const body = document.createElement("div");
        body.className = "card-body";

        const title = document.createElement("div");
        title.className = "card-title";
        title.textContent = item.title;
        body.appendChild(title);

        const tag = document.createElement("div");
        tag.className = "card-tag";
        tag.textContent = "#" + item.category;
        body.appendChild(tag);

        const prompt = document.createElement("div");
        prompt.className = "card-prompt";
        prompt.textContent = item.prompt;
        body.appendChild(prompt);

        const buttons = document.createElement("div");
        buttons.className = "btn-row";

        const remix = document.createElement("button");
        remix.className = "btn primary";
        remix.textContent = "Remix";
        remix.addEventListener("click", async () => {
          const data = await api("/app/remix", { id: item.id });
          if (data) {
            applySnapshot(data);
            switchView("builder");
          }
        });
        buttons.appendChild(remix);

        const copy = document.createElement("button");
        copy.className = "btn";
        copy.textContent = "Copy";
        copy.addEventListener("click", () => copyPrompt(item.prompt));
        buttons.appendChild(copy);

        body.appendChild(buttons);
        card.appendChild(body);
        grid.appendChild(card);
      }
    }

    function applySnapshot(data) {
      renderSelectors(data.rows || []);
      el("preview-output").value = data.preview || "";

      const freeText = el("free-text");
      if (document.activeElement !== freeText) {
        freeText.value = data.free_text || "";
      }

      if ((data.composed || "") !== lastComposed) {
        lastComposed = data.composed || "";
        revealComposed(lastComposed);
      }

      renderLibrary(data.library || []);
      renderGallery(data.gallery || [], !!data.expanded);
      document.body.dataset.theme = data.theme === "light" ? "light" : "dark";

      if (data.notice && data.notice_seq !== lastNoticeSeq) {
        showToast(data.notice);
      }
      lastNoticeSeq = data.notice_seq || lastNoticeSeq;
    }

    function switchView(name) {
      for (const item of document.querySelectorAll(".nav-item")) {
        item.classList.toggle("active", item.dataset.view === name);
      }
      for (const view of document.querySelectorAll(".view")) {
        view.classList.toggle("hidden", view.id !== name + "-view");
      }
      el("view-title").textContent = viewTitles[name] || name;
    }

    async function copyPrompt(prompt) {
      try {
        await navigator.clipboard.writeText(prompt);
      } catch (_) {
        // The backend copy below still reaches the system clipboard.
      }
      const data = await api("/app/copy", { prompt });
      if (data) applySnapshot(data);
    }

    async function savePrompt(prompt) {
      const data = await api("/app/save", { prompt });
      if (data) applySnapshot(data);
    }

    async function loadUrl() {
      const input = el("url-input");
      const data = await api("/app/navigate", { url: input.value });
      if (!data) return;
      if (data.notice) showToast(data.notice);
      if (data.url) {
        el("browser-frame").src = data.url;
        el("browser-placeholder").classList.add("hidden");
      }
    }

    for (const item of document.querySelectorAll(".nav-item")) {
      item.addEventListener("click", () => switchView(item.dataset.view));
    }

    el("theme-toggle").addEventListener("click", async () => {
      const next = document.body.dataset.theme === "dark" ? "light" : "dark";
      const data = await api("/app/theme", { theme: next });
      if (data) applySnapshot(data);
    });

    el("free-text").addEventListener("change", async () => {
      const data = await api("/app/free-text", { value: el("free-text").value });
      if (data) applySnapshot(data);
    });

    el("enhance-btn").addEventListener("click", async () => {
      const data = await api("/app/enhance", {
        text: el("free-text").value,
        negative: el("negative-input").value,
        aspect_ratio: el("aspect-select").value,
        engine: el("engine-select").value,
      });
      if (data) applySnapshot(data);
    });

    el("copy-preview").addEventListener("click", () => copyPrompt(el("preview-output").value));
    el("save-preview").addEventListener("click", () => savePrompt(el("preview-output").value));
    el("copy-composed").addEventListener("click", () => copyPrompt(el("composed-output").value));
    el("save-composed").addEventListener("click", () => savePrompt(el("composed-output").value));

    el("open-library").addEventListener("click", async () => {
      const data = await api("/app/open-library", {});
      if (data && data.path) showToast("Library page: " + data.path);
    });

    el("gallery-refresh").addEventListener("click", async () => {
      const data = await api("/app/gallery/refresh", {});
      if (data) applySnapshot(data);
    });

    el("gallery-toggle").addEventListener("click", async () => {
      const data = await api("/app/gallery/toggle", {});
      if (data) applySnapshot(data);
    });

    el("go-btn").addEventListener("click", loadUrl);
    el("url-input").addEventListener("keypress", (event) => {
      if (event.key === "Enter") loadUrl();
    });

    (async () => {
      const data = await api("/app/init");
      if (data) applySnapshot(data);
    })();
  </script>
</body>
</html>
"##;
