// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Emulated browser surface for the page sandbox
//!
//! Just enough of the fingerprinting-relevant APIs for captured scripts to run
//! to completion. Interfaces keep their members on prototypes and expose
//! navigator/screen values through prototype getters, as browsers do, so the
//! instrumentation exercises the same lookup paths it does in a real page.
//! Canvas exports are PNG-signed byte strings derived from the draw calls.

/// Installs `window`, canvas, WebGL, audio, storage, navigator, screen,
/// `document` and a deferred timer queue
pub const EMULATED_BROWSER_JS: &str = r#"var window = globalThis;
var self = window;

(function (root) {
    var B64 = 'ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/';

    function base64(bytes) {
        var out = '';
        for (var i = 0; i < bytes.length; i += 3) {
            var n = (bytes[i] << 16) | ((bytes[i + 1] || 0) << 8) | (bytes[i + 2] || 0);
            out += B64.charAt((n >> 18) & 63) + B64.charAt((n >> 12) & 63);
            out += i + 1 < bytes.length ? B64.charAt((n >> 6) & 63) : '=';
            out += i + 2 < bytes.length ? B64.charAt(n & 63) : '=';
        }
        return out;
    }

    function defineGetters(proto, values) {
        Object.keys(values).forEach(function (name) {
            var value = values[name];
            Object.defineProperty(proto, name, {
                configurable: true,
                enumerable: true,
                get: function () { return value; }
            });
        });
    }

    function HTMLCanvasElement() {
        this.width = 300;
        this.height = 150;
        this.__ops = [];
    }
    HTMLCanvasElement.prototype.getContext = function (kind) {
        if (kind === '2d') {
            return this.__ctx2d || (this.__ctx2d = new CanvasRenderingContext2D(this));
        }
        if (kind === 'webgl' || kind === 'experimental-webgl') {
            return this.__gl || (this.__gl = new WebGLRenderingContext(this));
        }
        return null;
    };
    HTMLCanvasElement.prototype.toDataURL = function () {
        var bytes = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        var text = this.width + 'x' + this.height + ';' + this.__ops.join(';');
        for (var i = 0; i < text.length; i++) {
            bytes.push(text.charCodeAt(i) & 0xff);
        }
        return 'data:image/png;base64,' + base64(bytes);
    };

    function CanvasRenderingContext2D(canvas) {
        this.canvas = canvas;
        this.font = '10px sans-serif';
        this.fillStyle = '#000000';
        this.strokeStyle = '#000000';
        this.textBaseline = 'alphabetic';
        this.globalCompositeOperation = 'source-over';
    }
    function draw(op) {
        return function () {
            this.canvas.__ops.push(op + '(' + Array.prototype.slice.call(arguments).join(',') + ')');
        };
    }
    ['fillText', 'strokeText', 'fillRect', 'strokeRect', 'clearRect', 'arc', 'rect',
     'moveTo', 'lineTo', 'beginPath', 'closePath', 'fill', 'stroke', 'rotate',
     'translate', 'scale'].forEach(function (op) {
        CanvasRenderingContext2D.prototype[op] = draw(op);
    });
    CanvasRenderingContext2D.prototype.measureText = function (text) {
        return { width: String(text).length * 6 };
    };
    CanvasRenderingContext2D.prototype.getImageData = function (x, y, w, h) {
        return { width: w, height: h, data: new Array(w * h * 4).fill(0) };
    };
    CanvasRenderingContext2D.prototype.isPointInPath = function () {
        return false;
    };

    var GL_PARAMETERS = {
        7936: 'WebKit',
        7937: 'WebKit WebGL',
        7938: 'WebGL 1.0',
        35724: 'WebGL GLSL ES 1.0',
        37445: 'fpwatch',
        37446: 'fpwatch emulated renderer',
        3379: 16384,
        34921: 16
    };
    function WebGLRenderingContext(canvas) {
        this.canvas = canvas;
    }
    WebGLRenderingContext.prototype.VENDOR = 7936;
    WebGLRenderingContext.prototype.RENDERER = 7937;
    WebGLRenderingContext.prototype.VERSION = 7938;
    WebGLRenderingContext.prototype.SHADING_LANGUAGE_VERSION = 35724;
    WebGLRenderingContext.prototype.MAX_TEXTURE_SIZE = 3379;
    WebGLRenderingContext.prototype.RGBA = 6408;
    WebGLRenderingContext.prototype.UNSIGNED_BYTE = 5121;
    WebGLRenderingContext.prototype.getParameter = function (pname) {
        return GL_PARAMETERS.hasOwnProperty(pname) ? GL_PARAMETERS[pname] : null;
    };
    WebGLRenderingContext.prototype.getExtension = function (name) {
        if (name === 'WEBGL_debug_renderer_info') {
            return { UNMASKED_VENDOR_WEBGL: 37445, UNMASKED_RENDERER_WEBGL: 37446 };
        }
        return null;
    };
    WebGLRenderingContext.prototype.getSupportedExtensions = function () {
        return ['WEBGL_debug_renderer_info'];
    };
    WebGLRenderingContext.prototype.readPixels = function (x, y, w, h, format, type, pixels) {
        if (pixels && pixels.length !== undefined) {
            for (var i = 0; i < pixels.length; i++) {
                pixels[i] = 0;
            }
        }
    };

    function audioNode(extra) {
        var node = {
            connect: function (target) { return target; },
            disconnect: function () {}
        };
        Object.keys(extra || {}).forEach(function (key) { node[key] = extra[key]; });
        return node;
    }
    function AudioContext() {
        this.sampleRate = 44100;
        this.currentTime = 0;
        this.state = 'running';
        this.destination = audioNode({ maxChannelCount: 2 });
    }
    AudioContext.prototype.createAnalyser = function () {
        return audioNode({
            fftSize: 2048,
            frequencyBinCount: 1024,
            getFloatFrequencyData: function (array) {
                for (var i = 0; i < array.length; i++) {
                    array[i] = -100;
                }
            }
        });
    };
    AudioContext.prototype.createOscillator = function () {
        return audioNode({ type: 'sine', frequency: { value: 440 }, start: function () {}, stop: function () {} });
    };
    AudioContext.prototype.createDynamicsCompressor = function () {
        return audioNode({ threshold: { value: -24 }, knee: { value: 30 }, ratio: { value: 12 } });
    };
    AudioContext.prototype.createGain = function () {
        return audioNode({ gain: { value: 1 } });
    };
    AudioContext.prototype.close = function () {
        this.state = 'closed';
    };

    function Storage() {
        Object.defineProperty(this, '__items', { value: {}, enumerable: false });
    }
    Storage.prototype.getItem = function (key) {
        key = String(key);
        return this.__items.hasOwnProperty(key) ? this.__items[key] : null;
    };
    Storage.prototype.setItem = function (key, value) {
        this.__items[String(key)] = String(value);
    };
    Storage.prototype.removeItem = function (key) {
        delete this.__items[String(key)];
    };
    Storage.prototype.clear = function () {
        var items = this.__items;
        Object.keys(items).forEach(function (key) { delete items[key]; });
    };
    Object.defineProperty(Storage.prototype, 'length', {
        configurable: true,
        get: function () { return Object.keys(this.__items).length; }
    });

    function Navigator() {}
    defineGetters(Navigator.prototype, {
        userAgent: 'Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36',
        language: 'en-US',
        languages: ['en-US', 'en'],
        platform: 'Linux x86_64',
        hardwareConcurrency: 8,
        cookieEnabled: true,
        doNotTrack: null,
        plugins: []
    });

    function Screen() {}
    defineGetters(Screen.prototype, {
        width: 1920,
        height: 1080,
        availWidth: 1920,
        availHeight: 1040,
        colorDepth: 24,
        pixelDepth: 24
    });

    var timers = [];
    function schedule(fn, args) {
        if (typeof fn === 'function') {
            timers.push({ fn: fn, args: args, done: false });
        }
        return timers.length;
    }

    root.HTMLCanvasElement = HTMLCanvasElement;
    root.CanvasRenderingContext2D = CanvasRenderingContext2D;
    root.WebGLRenderingContext = WebGLRenderingContext;
    root.AudioContext = AudioContext;
    root.OfflineAudioContext = AudioContext;
    root.webkitAudioContext = AudioContext;
    root.Storage = Storage;
    root.Navigator = Navigator;
    root.Screen = Screen;
    root.localStorage = new Storage();
    root.sessionStorage = new Storage();
    root.navigator = new Navigator();
    root.screen = new Screen();
    root.devicePixelRatio = 1;

    root.document = {
        cookie: '',
        referrer: '',
        createElement: function (tag) {
            if (String(tag).toLowerCase() === 'canvas') {
                return new HTMLCanvasElement();
            }
            return { tagName: String(tag).toUpperCase(), style: {}, appendChild: function (c) { return c; } };
        },
        getElementById: function () { return null; },
        body: { appendChild: function (c) { return c; }, removeChild: function (c) { return c; } }
    };

    root.setTimeout = function (fn) {
        return schedule(fn, Array.prototype.slice.call(arguments, 2));
    };
    root.setInterval = root.setTimeout;
    root.requestAnimationFrame = function (fn) {
        return schedule(fn, [0]);
    };
    root.clearTimeout = function (id) {
        if (timers[id - 1]) {
            timers[id - 1].done = true;
        }
    };
    root.clearInterval = root.clearTimeout;
    root.cancelAnimationFrame = root.clearTimeout;

    // Runs pending timer callbacks (intervals fire once), at most `limit` of them
    root.__fpwatchFlushTimers = function (limit) {
        var ran = 0;
        for (var i = 0; i < timers.length && ran < limit; i++) {
            var timer = timers[i];
            if (!timer.done) {
                timer.done = true;
                ran++;
                try {
                    timer.fn.apply(root, timer.args);
                } catch (e) {
                    // a failing callback does not stop the others
                }
            }
        }
        return ran;
    };
})(window);
"#;
