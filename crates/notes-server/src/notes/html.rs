//! Inline HTML template for the note editor page

use crate::note_id::NoteId;

/// Milliseconds between autosave checks in the editor.
pub const AUTOSAVE_INTERVAL_MS: u32 = 1000;

/// Editor page for a single note.
///
/// The note's content is embedded in the page even when the note is password
/// protected; the password overlay only hides it until the browser has
/// verified the password.
pub fn note_page(base_path: &str, id: &NoteId, content: &str, has_password: bool) -> String {
    let overlay = if has_password { PASSWORD_OVERLAY } else { "" };
    let checked = if has_password { "checked" } else { "" };
    let fields_class = if has_password { "" } else { "hidden" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
{overlay}
<div class="container">
    <textarea id="content">{content}</textarea>
</div>
<pre id="printable"></pre>
<button class="settings-btn" onclick="toggleSettings()">Settings</button>
<div class="settings-panel" id="settings-panel">
    <div class="password-settings">
        <h3>Password protection</h3>
        <div class="setting-row">
            <label>
                <input type="checkbox" id="enable-password" {checked}>
                Enable password
            </label>
        </div>
        <div id="password-fields" class="{fields_class}">
            <div class="setting-row">
                <input type="password" id="new-password" placeholder="New password">
            </div>
            <div class="setting-row">
                <button onclick="savePassword()">Save password</button>
                <button onclick="clearPassword()" class="danger">Remove password</button>
            </div>
        </div>
    </div>
</div>

<script>
const basePath = {base_json};
const noteName = {id_json};
const autosaveInterval = {interval};
let content = {content_json};
let passwordVerified = {verified};
{js}
</script>
</body>
</html>"#,
        title = html_escape(id.as_str()),
        css = CSS_STYLES,
        overlay = overlay,
        content = html_escape(content),
        checked = checked,
        fields_class = fields_class,
        base_json = script_string(base_path),
        id_json = script_string(id.as_str()),
        interval = AUTOSAVE_INTERVAL_MS,
        content_json = script_string(content),
        verified = !has_password,
        js = EDITOR_JS,
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Encode a string as a JavaScript literal that is safe inside `<script>`.
fn script_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

const PASSWORD_OVERLAY: &str = r#"
<div id="password-protection" class="password-overlay">
    <div class="password-form">
        <h2>This note is password protected</h2>
        <input type="password" id="password-input" placeholder="Password">
        <button onclick="verifyPassword()">Unlock</button>
        <div id="password-error" class="error-message"></div>
    </div>
</div>
"#;

const CSS_STYLES: &str = r#"
body {
    margin: 0;
    background: #ebeef1;
    font-family: sans-serif;
}
.container {
    position: absolute;
    top: 20px;
    right: 20px;
    bottom: 20px;
    left: 20px;
}
#content {
    margin: 0;
    padding: 20px;
    overflow-y: auto;
    resize: none;
    width: 100%;
    height: 100%;
    box-sizing: border-box;
    border: 1px solid #ddd;
    outline: none;
    font-family: monospace;
    font-size: 14px;
    line-height: 1.5;
}
#printable {
    display: none;
}
.settings-btn {
    position: fixed;
    top: 10px;
    right: 10px;
    z-index: 10;
    padding: 5px 10px;
    background: #4CAF50;
    color: white;
    border: none;
    border-radius: 3px;
    cursor: pointer;
}
.settings-panel {
    position: fixed;
    top: 40px;
    right: 10px;
    z-index: 10;
    background: white;
    border: 1px solid #ddd;
    border-radius: 3px;
    padding: 15px;
    box-shadow: 0 2px 10px rgba(0,0,0,0.1);
    display: none;
}
.password-overlay {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    bottom: 0;
    background: rgba(0,0,0,0.7);
    z-index: 100;
    display: flex;
    align-items: center;
    justify-content: center;
}
.password-form {
    background: white;
    padding: 20px;
    border-radius: 5px;
    width: 300px;
}
.password-form input {
    width: 100%;
    padding: 8px;
    margin: 10px 0;
    box-sizing: border-box;
}
.password-form button {
    width: 100%;
    padding: 8px;
    background: #4CAF50;
    color: white;
    border: none;
    border-radius: 3px;
    cursor: pointer;
}
.error-message {
    color: red;
    margin-top: 10px;
    font-size: 0.9em;
}
.setting-row {
    margin-bottom: 10px;
}
.setting-row button {
    margin-right: 5px;
    padding: 5px 10px;
}
.hidden {
    display: none;
}
.danger {
    background: #f44336;
    color: white;
    border: none;
    border-radius: 3px;
    cursor: pointer;
}
@media (prefers-color-scheme: dark) {
    body {
        background: #333b4d;
    }
    #content {
        background: #24262b;
        color: #fff;
        border-color: #495265;
    }
    .settings-panel, .password-form {
        background: #24262b;
        color: #fff;
        border-color: #495265;
    }
}
@media print {
    .container, .settings-btn, .settings-panel, .password-overlay {
        display: none;
    }
    #printable {
        display: block;
        white-space: pre-wrap;
        word-break: break-word;
    }
}
"#;

const EDITOR_JS: &str = r#"
const noteUrl = basePath + '/' + noteName;
const textarea = document.getElementById('content');
const printable = document.getElementById('printable');

function postNote(body) {
    return fetch(noteUrl, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body)
    }).then(response => response.json());
}

function toggleSettings() {
    const panel = document.getElementById('settings-panel');
    panel.style.display = panel.style.display === 'block' ? 'none' : 'block';
}

document.getElementById('enable-password').addEventListener('change', function() {
    document.getElementById('password-fields').classList.toggle('hidden', !this.checked);
});

function verifyPassword() {
    const password = document.getElementById('password-input').value;
    const errorDiv = document.getElementById('password-error');

    postNote({ password, action: 'verifyPassword' })
        .then(data => {
            if (data.success) {
                passwordVerified = true;
                document.getElementById('password-protection').style.display = 'none';
                textarea.value = content;
                textarea.focus();
            } else {
                errorDiv.textContent = 'Incorrect password, try again';
            }
        })
        .catch(err => {
            errorDiv.textContent = 'Verification failed, try again';
            console.error('Password verification error:', err);
        });
}

function savePassword() {
    const password = document.getElementById('new-password').value;
    if (!password) {
        alert('Enter a password first');
        return;
    }

    postNote({ password, passwordVerified: true })
        .then(data => {
            if (data.success) {
                alert('Password saved');
                toggleSettings();
            } else {
                alert('Could not save the password');
            }
        });
}

function clearPassword() {
    if (!confirm('Remove password protection from this note?')) {
        return;
    }

    postNote({ clearPassword: 'true', passwordVerified: true })
        .then(data => {
            if (data.success) {
                alert('Password removed');
                document.getElementById('enable-password').checked = false;
                document.getElementById('password-fields').classList.add('hidden');
                toggleSettings();
            } else {
                alert('Could not remove the password');
            }
        });
}

function uploadContent() {
    if (!passwordVerified || content === textarea.value) {
        setTimeout(uploadContent, autosaveInterval);
        return;
    }

    const pending = textarea.value;
    postNote({ text: pending, passwordVerified: true })
        .then(data => {
            if (data.success) {
                content = pending;
                printable.textContent = pending;
            }
        })
        .catch(err => console.error('Save failed:', err))
        .finally(() => setTimeout(uploadContent, autosaveInterval));
}

textarea.value = passwordVerified ? content : '';
printable.textContent = content;
if (passwordVerified) {
    textarea.focus();
}
uploadContent();
"#;
